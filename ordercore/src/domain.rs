//! Domain documents and enumerations.
//!
//! These are the durable shapes the [`crate::store::ShopStore`] persists:
//! products, carts, orders, and users. Order line items are deliberate
//! snapshots of product state at purchase time, decoupled from the live
//! catalog so historical orders stay accurate after price or catalog
//! changes.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::config;
use crate::errors::DomainError;
use crate::types::{
    AddressLine, CartId, CityName, CountryName, CustomText, EmailAddress, ImageUrl, Money,
    OrderId, PersonName, PhoneNumber, ProductId, ProductName, Quantity, StateName, StockQuantity,
    Timestamp, UserId, ZipCode,
};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: ProductName,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Units currently in stock. Never negative by construction.
    pub stock: StockQuantity,
    /// Ordered list of image URIs; the first is the display image.
    pub images: Vec<ImageUrl>,
    /// Optional category label.
    pub category: Option<String>,
    /// When the product was created.
    pub created_at: Timestamp,
    /// When the product was last modified.
    pub updated_at: Timestamp,
}

impl Product {
    /// Create a new product with fresh timestamps.
    pub fn new(
        name: ProductName,
        description: Option<String>,
        price: Money,
        stock: StockQuantity,
        images: Vec<ImageUrl>,
        category: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: ProductId::new(),
            name,
            description,
            price,
            stock,
            images,
            category,
            created_at: now,
            updated_at: now,
        }
    }

    /// The display image, if any.
    pub fn first_image(&self) -> Option<&ImageUrl> {
        self.images.first()
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// One line of a cart: a product reference with quantity and optional
/// customization text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// The referenced product.
    pub product_id: ProductId,
    /// Requested units, at least 1.
    pub quantity: Quantity,
    /// Optional customization text.
    pub custom_text: Option<CustomText>,
}

/// A user's cart: the mutable staging area of intended purchases.
///
/// Exactly one cart per user. Created lazily on first add; emptied, not
/// deleted, when an order commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// The owning user.
    pub user_id: UserId,
    /// Ordered line items.
    pub items: Vec<CartLineItem>,
    /// When the cart was created.
    pub created_at: Timestamp,
    /// When the cart was last modified.
    pub updated_at: Timestamp,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for a product, if present.
    pub fn line_for(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add units of a product. An existing line has its quantity increased
    /// and its custom text replaced when new text is provided; otherwise a
    /// new line is appended.
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
        custom_text: Option<CustomText>,
    ) -> Result<(), DomainError> {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            line.quantity = line.quantity.checked_add(quantity)?;
            if custom_text.is_some() {
                line.custom_text = custom_text;
            }
        } else {
            self.items.push(CartLineItem {
                product_id,
                quantity,
                custom_text,
            });
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Replace a line's quantity and custom text. Returns `false` when the
    /// cart has no line for the product.
    pub fn set_line(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
        custom_text: Option<CustomText>,
    ) -> bool {
        let Some(line) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        else {
            return false;
        };
        line.quantity = quantity;
        line.custom_text = custom_text;
        self.updated_at = Timestamp::now();
        true
    }

    /// Drop the line for a product, keeping the cart itself. Removing an
    /// absent line is a no-op.
    pub fn remove_line(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
        self.updated_at = Timestamp::now();
    }

    /// Empty the cart, keeping the document.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Timestamp::now();
    }
}

/// An immutable snapshot of one purchased line.
///
/// Copies the product's name, display image, and unit price at purchase
/// time so later catalog edits cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// The purchased product's id, for provenance.
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub name: ProductName,
    /// Display image at purchase time, if the product had one.
    pub image: Option<ImageUrl>,
    /// Purchased units.
    pub quantity: Quantity,
    /// Unit price at purchase time.
    pub unit_price: Money,
}

impl OrderLineItem {
    /// Snapshot a product at purchase time.
    pub fn snapshot(product: &Product, quantity: Quantity) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image: product.first_image().cloned(),
            quantity,
            unit_price: product.price,
        }
    }

    /// Price of this line: unit price times quantity.
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }
}

/// Shipping destination recorded on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// First address line. Required.
    pub line1: AddressLine,
    /// Second address line (apartment, floor). Optional.
    pub line2: Option<AddressLine>,
    /// City. Required.
    pub city: CityName,
    /// State or province. Required.
    pub state: StateName,
    /// Postal code. Required.
    pub zip: ZipCode,
    /// Country; defaults to [`config::DEFAULT_COUNTRY`] when not given.
    pub country: CountryName,
}

impl ShippingAddress {
    /// Assemble an address, applying the default country when none is
    /// provided.
    pub fn new(
        line1: AddressLine,
        line2: Option<AddressLine>,
        city: CityName,
        state: StateName,
        zip: ZipCode,
        country: Option<CountryName>,
    ) -> Self {
        let country = country.unwrap_or_else(|| {
            CountryName::try_new(config::DEFAULT_COUNTRY)
                .expect("default country is a valid country name")
        });
        Self {
            line1,
            line2,
            city,
            state,
            zip,
            country,
        }
    }
}

/// How the buyer pays for an order. Fixed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[serde(rename = "COD")]
    Cod,
    /// Card payment.
    Card,
    /// UPI transfer.
    #[serde(rename = "UPI")]
    Upi,
    /// Net banking transfer.
    NetBanking,
}

impl PaymentMethod {
    /// Payment status a fresh order starts in.
    ///
    /// Cash on delivery is collected later, every other method settles at
    /// placement.
    pub const fn initial_payment_status(self) -> PaymentStatus {
        match self {
            Self::Cod => PaymentStatus::Pending,
            Self::Card | Self::Upi | Self::NetBanking => PaymentStatus::Completed,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Card => write!(f, "Card"),
            Self::Upi => write!(f, "UPI"),
            Self::NetBanking => write!(f, "NetBanking"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "Card" => Ok(Self::Card),
            "UPI" => Ok(Self::Upi),
            "NetBanking" => Ok(Self::NetBanking),
            other => Err(DomainError::InvalidPaymentMethod(format!(
                "Unknown payment method: {other}"
            ))),
        }
    }
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Payment not yet collected (cash on delivery).
    Pending,
    /// Payment settled.
    Completed,
    /// Payment attempt failed.
    Failed,
    /// Payment returned after cancellation or dispute.
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Refunded => write!(f, "Refunded"),
        }
    }
}

/// Fulfilment state of an order.
///
/// Forward-only: Pending → Processing → Shipped → Delivered. Cancellation
/// is reachable only from Pending or Processing and only through
/// [`crate::lifecycle::LifecycleManager::cancel_order`], because it
/// restocks products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed, not yet picked up for processing.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Cancelled; stock has been returned.
    Cancelled,
}

impl OrderStatus {
    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
            Self::Cancelled => 4,
        }
    }

    /// Whether the owning user may still cancel.
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether an administrator may set this value directly. Cancelled is
    /// excluded: cancellation restocks, so it has its own operation.
    pub const fn is_admin_settable(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Processing | Self::Shipped | Self::Delivered
        )
    }

    /// Whether the status may move from `self` to `next`: same-or-forward
    /// along the fulfilment chain, never out of Cancelled.
    pub const fn can_become(self, next: Self) -> bool {
        match self {
            Self::Cancelled => false,
            _ => match next {
                Self::Cancelled => self.is_cancellable(),
                _ => next.rank() >= self.rank(),
            },
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// An immutable purchase record created by successfully committing a cart.
///
/// Line items and total never change after creation; only `status`,
/// `payment_status`, and `updated_at` do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The buying user.
    pub user_id: UserId,
    /// The cart this order was committed from. Provenance only, never a
    /// live reference.
    pub cart_id: CartId,
    /// Snapshotted purchase lines.
    pub items: Vec<OrderLineItem>,
    /// Shipping destination.
    pub shipping_address: ShippingAddress,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Sum over items of unit price times quantity.
    pub total: Money,
    /// Fulfilment state.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: Timestamp,
    /// When the order was last modified.
    pub updated_at: Timestamp,
}

impl Order {
    /// Create a freshly placed order.
    ///
    /// `total` must equal the sum of the items' subtotals; the engine
    /// computes both together with [`Self::total_from_items`].
    pub fn new(
        user_id: UserId,
        cart_id: CartId,
        items: Vec<OrderLineItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        total: Money,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: OrderId::new(),
            user_id,
            cart_id,
            items,
            shipping_address,
            payment_method,
            payment_status: payment_method.initial_payment_status(),
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum the subtotals of a set of order lines.
    pub fn total_from_items(items: &[OrderLineItem]) -> Result<Money, DomainError> {
        items.iter().try_fold(Money::zero(), |acc, item| {
            acc.checked_add(item.subtotal()?)
        })
    }
}

/// Stored password material: a per-user random salt and the digest of
/// salt plus password. Derivation and verification live in
/// [`crate::accounts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredential {
    /// Hex-encoded random salt.
    pub salt: String,
    /// Hex-encoded digest of salt and password.
    pub hash: String,
}

/// Authorization role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    Customer,
    /// Catalog and order administrator.
    Admin,
}

impl Role {
    /// Whether this role may use administrative operations.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
    /// Login email; unique across users.
    pub email: EmailAddress,
    /// Contact phone; unique across users.
    pub phone: PhoneNumber,
    /// Stored password material.
    pub credential: PasswordCredential,
    /// Authorization role.
    pub role: Role,
    /// Saved shipping addresses.
    pub addresses: Vec<ShippingAddress>,
    /// When the account was created.
    pub created_at: Timestamp,
    /// When the account was last modified.
    pub updated_at: Timestamp,
}

impl User {
    /// Create a customer account.
    pub fn new(
        name: PersonName,
        email: EmailAddress,
        phone: PhoneNumber,
        credential: PasswordCredential,
        addresses: Vec<ShippingAddress>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: UserId::new(),
            name,
            email,
            phone,
            credential,
            role: Role::Customer,
            addresses,
            created_at: now,
            updated_at: now,
        }
    }
}
