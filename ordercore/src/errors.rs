//! Error types for `OrderCore`.
//!
//! The error design follows the same principles as the rest of the library:
//!
//! - **Type safety**: different error types for different subsystems
//! - **Actionable**: callers can determine how to handle each error
//! - **Composable**: errors convert between layers without losing detail
//!
//! # Error Categories
//!
//! - [`DomainError`]: scalar validation failures (rare in practice because
//!   validation happens at type construction)
//! - [`StoreError`]: storage and persistence layer failures
//! - [`OrderError`]: order placement and lifecycle failures
//! - [`CartError`] / [`CatalogError`] / [`AccountError`]: the surrounding
//!   services
//!
//! # Handling Strategy
//!
//! - `TransactionConflict` is retryable: re-read state and resubmit. The
//!   engine never retries on the caller's behalf.
//! - Business rule violations (`EmptyCart`, `ItemsOutOfStock`,
//!   `BelowMinimumOrder`, `NotCancellable`) carry enough structure for a
//!   user-facing message.
//! - `Storage` wraps infrastructure failures whose detail should stay out
//!   of responses.

use crate::store::{DocumentKey, ExpectedRevision, Revision};
use crate::types::{
    AddressLineError, CityNameError, CountryNameError, CustomTextError, EmailAddressError,
    ImageUrlError, Money, OrderId, PasswordError, PersonNameError, PhoneNumberError, ProductId,
    ProductName, ProductNameError, StateNameError, UserId, ZipCodeError,
};
use thiserror::Error;

/// Validation failures for scalar domain values.
///
/// Produced by the smart constructors in [`crate::types`]; by the time a
/// value reaches the engine these have already been ruled out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Invalid money amount.
    #[error("Invalid money amount: {0}")]
    InvalidMoney(String),
    /// Invalid line quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Invalid product name.
    #[error("Invalid product name: {0}")]
    InvalidProductName(String),
    /// Invalid custom text.
    #[error("Invalid custom text: {0}")]
    InvalidCustomText(String),
    /// Invalid email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    /// Invalid phone number.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
    /// Invalid person name.
    #[error("Invalid name: {0}")]
    InvalidPersonName(String),
    /// Invalid password.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
    /// Invalid shipping address component.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// Unknown payment method.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),
    /// Invalid image URI.
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl From<ProductNameError> for DomainError {
    fn from(err: ProductNameError) -> Self {
        Self::InvalidProductName(err.to_string())
    }
}

impl From<CustomTextError> for DomainError {
    fn from(err: CustomTextError) -> Self {
        Self::InvalidCustomText(err.to_string())
    }
}

impl From<EmailAddressError> for DomainError {
    fn from(err: EmailAddressError) -> Self {
        Self::InvalidEmail(err.to_string())
    }
}

impl From<PhoneNumberError> for DomainError {
    fn from(err: PhoneNumberError) -> Self {
        Self::InvalidPhone(err.to_string())
    }
}

impl From<PersonNameError> for DomainError {
    fn from(err: PersonNameError) -> Self {
        Self::InvalidPersonName(err.to_string())
    }
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        Self::InvalidPassword(err.to_string())
    }
}

impl From<AddressLineError> for DomainError {
    fn from(err: AddressLineError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<CityNameError> for DomainError {
    fn from(err: CityNameError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<StateNameError> for DomainError {
    fn from(err: StateNameError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<ZipCodeError> for DomainError {
    fn from(err: ZipCodeError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<CountryNameError> for DomainError {
    fn from(err: CountryNameError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<ImageUrlError> for DomainError {
    fn from(err: ImageUrlError) -> Self {
        Self::InvalidImage(err.to_string())
    }
}

/// Errors that can occur when interacting with the shop store.
///
/// # Common Scenarios
///
/// - **RevisionConflict**: another request modified the document between
///   read and commit; the whole batch was aborted and nothing was written
/// - **DuplicateKey**: an insert collided with an existing unique key
/// - **DocumentNotFound**: a guarded write targeted a missing document
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A guarded write targeted a document that does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentKey),

    /// A revision expectation failed; the batch was aborted.
    #[error("Revision conflict on {key}: expected {expected:?}, but current is {current:?}")]
    RevisionConflict {
        /// The document with the conflicting revision.
        key: DocumentKey,
        /// The revision the writer expected.
        expected: ExpectedRevision,
        /// The revision actually stored, if the document exists.
        current: Option<Revision>,
    },

    /// An insert collided with an existing unique key.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The connection to the store failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Encoding or decoding a stored document failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from order placement and lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    /// The shipping address was malformed or incomplete.
    #[error("Invalid shipping address: {0}")]
    InvalidAddress(String),

    /// The payment method is not one of the supported values.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// The user's cart is absent or has no line items.
    #[error("Your cart is empty")]
    EmptyCart,

    /// One or more cart lines asked for more units than are in stock.
    ///
    /// Contains the name of every short product, in cart order. Even one
    /// short line blocks the whole order.
    #[error("Some items are out of stock: {}", product_names.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    ItemsOutOfStock {
        /// Names of the products with insufficient stock.
        product_names: Vec<ProductName>,
    },

    /// The priced cart total is under the minimum order amount.
    #[error("Minimum order amount is {minimum}, cart total is {total}")]
    BelowMinimumOrder {
        /// The computed cart total.
        total: Money,
        /// The configured minimum.
        minimum: Money,
    },

    /// The requested status value is not reachable for this order.
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    /// The order is missing, not owned by the caller, or past the point of
    /// cancellation.
    #[error("Order {0} cannot be cancelled at this stage")]
    NotCancellable(OrderId),

    /// No order with this id is visible to the caller.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// A concurrent request won the race; re-read and retry if desired.
    #[error("Transaction conflict on documents: {documents:?}")]
    TransactionConflict {
        /// The documents whose revisions conflicted.
        documents: Vec<DocumentKey>,
    },

    /// An order insert collided with an existing order id.
    #[error("Duplicate order detected")]
    DuplicateOrder,

    /// Domain arithmetic or construction failed mid-operation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store failed in a way the caller cannot act on.
    #[error("Store error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict { key, .. } => Self::TransactionConflict {
                documents: vec![key],
            },
            StoreError::DuplicateKey(_) => Self::DuplicateOrder,
            other => Self::Storage(other),
        }
    }
}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            DomainError::InvalidPaymentMethod(msg) => Self::InvalidPaymentMethod(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Result type for order operations.
pub type OrderResult<T> = Result<T, OrderError>;

/// Errors from cart management.
#[derive(Debug, Clone, Error)]
pub enum CartError {
    /// The referenced product does not exist in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// The user has no cart yet.
    #[error("Cart not found for user {0}")]
    CartNotFound(UserId),

    /// The cart has no line for this product.
    #[error("Item {0} not found in cart")]
    ItemNotFound(ProductId),

    /// A scalar value failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A concurrent cart update won the race.
    #[error("Cart conflict: {0}")]
    Conflict(String),

    /// The store failed.
    #[error("Store error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for CartError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict { .. } | StoreError::DuplicateKey(_) => {
                Self::Conflict(err.to_string())
            }
            other => Self::Storage(other),
        }
    }
}

impl From<DomainError> for CartError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Errors from catalog management.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// No product with this id.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// A scalar value failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A concurrent catalog update won the race.
    #[error("Catalog conflict: {0}")]
    Conflict(String),

    /// The store failed.
    #[error("Store error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict { .. } | StoreError::DuplicateKey(_) => {
                Self::Conflict(err.to_string())
            }
            other => Self::Storage(other),
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from account registration and login.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    /// The email address is already registered.
    #[error("User already exists")]
    EmailTaken,

    /// The phone number is already registered.
    #[error("Phone number already in use")]
    PhoneTaken,

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A scalar value failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A concurrent registration won the race.
    #[error("Account conflict: {0}")]
    Conflict(String),

    /// The store failed.
    #[error("Store error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict { .. } | StoreError::DuplicateKey(_) => {
                Self::Conflict(err.to_string())
            }
            other => Self::Storage(other),
        }
    }
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;
