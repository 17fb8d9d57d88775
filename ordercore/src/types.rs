//! Core types for the `OrderCore` library.
//!
//! This module defines the fundamental types used throughout the library.
//! All types use smart constructors to ensure validity at construction time,
//! following the "parse, don't validate" principle: once a value exists, no
//! further validation is needed anywhere downstream.

use chrono::{DateTime, Utc};
use nutype::nutype;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::errors::DomainError;

/// Unique identifier for a user account, backed by a UUIDv7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new identifier with the current timestamp.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a catalog product, backed by a UUIDv7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new identifier with the current timestamp.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a cart, backed by a UUIDv7.
///
/// A cart belongs to exactly one user; the id exists so that orders can
/// record which cart they were committed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(Uuid);

impl CartId {
    /// Creates a new identifier with the current timestamp.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for an order, backed by a UUIDv7.
///
/// UUIDv7 gives orders a time-sortable identity, so "newest first" listings
/// fall out of the id ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new identifier with the current timestamp.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Product name with validation.
///
/// Non-empty, at most 100 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ProductName(String);

/// Free-text customization attached to a cart line item.
///
/// At most 100 characters; may be empty.
#[nutype(
    sanitize(trim),
    validate(len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct CustomText(String);

/// Customer email address with basic format validation.
#[nutype(
    sanitize(trim),
    validate(
        not_empty,
        len_char_max = 255,
        regex = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct EmailAddress(String);

/// Phone number: optional leading `+`, 7 to 15 digits.
#[nutype(
    sanitize(trim),
    validate(regex = r"^\+?[0-9]{7,15}$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PhoneNumber(String);

/// A person's display name. Non-empty, at most 50 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PersonName(String);

/// A raw password accepted at the account boundary.
///
/// Only length is checked here; the value is hashed immediately on
/// registration and never stored.
#[nutype(
    validate(len_char_min = 8, len_char_max = 128),
    derive(Clone, PartialEq, Eq, AsRef, Deref, TryFrom)
)]
pub struct Password(String);

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// First line of a street address. Non-empty, at most 100 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct AddressLine(String);

/// City name. Non-empty, at most 64 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct CityName(String);

/// State or province name. Non-empty, at most 64 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct StateName(String);

/// Postal / ZIP code. Non-empty, at most 20 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 20),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ZipCode(String);

/// Country name. Non-empty, at most 56 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 56),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct CountryName(String);

/// Product image URI. Non-empty, at most 2048 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 2048),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ImageUrl(String);

/// Quantity of a product in a cart line or order line.
///
/// Must be at least 1, at most [`Quantity::MAX_QUANTITY`] per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    /// Maximum quantity per line item.
    pub const MAX_QUANTITY: u32 = 1000;

    /// Create a new quantity.
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidQuantity(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if value > Self::MAX_QUANTITY {
            return Err(DomainError::InvalidQuantity(format!(
                "Quantity {value} exceeds maximum {}",
                Self::MAX_QUANTITY
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Add quantities, checking the per-line maximum.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        let new_value = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::InvalidQuantity("Quantity overflow".to_string()))?;
        Self::new(new_value)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stock level of a catalog product.
///
/// Unlike [`Quantity`], zero is a valid stock level. The type is unsigned
/// and all mutation is checked, so stock can never go negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StockQuantity(u32);

impl StockQuantity {
    /// Create a stock level.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the underlying value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether the given quantity can be taken from this stock level.
    pub const fn can_satisfy(self, quantity: Quantity) -> bool {
        self.0 >= quantity.value()
    }

    /// Remove `quantity` units, or `None` if stock is insufficient.
    pub fn checked_sub(self, quantity: Quantity) -> Option<Self> {
        self.0.checked_sub(quantity.value()).map(Self)
    }

    /// Return `quantity` units to stock, or `None` on overflow.
    pub fn checked_add(self, quantity: Quantity) -> Option<Self> {
        self.0.checked_add(quantity.value()).map(Self)
    }
}

impl Display for StockQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount with validation.
///
/// Uses `Decimal` for precise arithmetic. Must be non-negative with at most
/// 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Maximum money amount (100 million currency units).
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

    /// Create money from minor units (avoids floating point issues).
    pub fn from_minor_units(units: i64) -> Result<Self, DomainError> {
        Self::new(Decimal::new(units, 2))
    }

    /// Create money from a decimal amount.
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() {
            return Err(DomainError::InvalidMoney(format!(
                "Money amount cannot be negative: {amount}"
            )));
        }
        if amount.scale() > 2 {
            return Err(DomainError::InvalidMoney(format!(
                "Money amount cannot have more than 2 decimal places: {amount}"
            )));
        }
        if amount > Self::MAX_AMOUNT {
            return Err(DomainError::InvalidMoney(format!(
                "Money amount {amount} exceeds maximum {}",
                Self::MAX_AMOUNT
            )));
        }
        Ok(Self(amount))
    }

    /// Zero currency units.
    pub const fn zero() -> Self {
        Self(Decimal::from_parts(0, 0, 0, false, 0))
    }

    /// Get the underlying decimal value.
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Convert to minor units for storage.
    pub fn to_minor_units(self) -> i64 {
        (self.0 * Decimal::from(100)).to_i64().unwrap_or(0)
    }

    /// Add money amounts.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        Self::new(self.0 + other.0)
    }

    /// Multiply by a line quantity.
    pub fn checked_mul_quantity(self, quantity: Quantity) -> Result<Self, DomainError> {
        Self::new(self.0 * Decimal::from(quantity.value()))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::str::FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = s.trim().parse::<Decimal>().map_err(|e| {
            DomainError::InvalidMoney(format!("Failed to parse money amount '{s}': {e}"))
        })?;
        Self::new(decimal)
    }
}

/// A timestamp recording when a document was created or last modified.
///
/// This wrapper ensures consistent timestamp handling throughout the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a new timestamp from a UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a timestamp representing the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Converts the timestamp into the underlying `DateTime`.
    pub const fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.into_datetime()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
