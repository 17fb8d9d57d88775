//! Fixed business configuration.
//!
//! These are contract constants, not tunables: the HTTP surface and the
//! stored documents both assume them.

use rust_decimal::Decimal;

use crate::types::Money;

/// Minimum order total, in currency units. Carts pricing below this are
/// rejected at placement.
pub const MINIMUM_ORDER_TOTAL: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Country recorded on a shipping address when the caller provides none.
pub const DEFAULT_COUNTRY: &str = "India";

/// The minimum order total as [`Money`].
pub fn minimum_order_total() -> Money {
    Money::new(MINIMUM_ORDER_TOTAL).expect("minimum order total is a valid money amount")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_order_total_is_100_units() {
        assert_eq!(minimum_order_total().to_minor_units(), 10_000);
    }
}
