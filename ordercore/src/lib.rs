//! `OrderCore` - order placement and fulfillment core for an e-commerce backend
//!
//! This library implements the transactional heart of the shop: placing an
//! order atomically reconciles the user's cart against live product stock,
//! snapshots prices into an immutable order record, and rolls every side
//! effect back on any failure. All writes flow through a single atomic
//! [`store::ShopStore::commit`] guarded by per-document revisions, so
//! concurrent placements can never oversell stock or double-clear a cart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod store;
pub mod types;

pub use accounts::{AccountService, Registration};
pub use cart::{CartService, CartView, CartViewItem};
pub use catalog::{CatalogService, NewProduct, ProductUpdate};
pub use domain::{
    Cart, CartLineItem, Order, OrderLineItem, OrderStatus, PaymentMethod, PaymentStatus, Product,
    Role, ShippingAddress, User,
};
pub use engine::PlacementEngine;
pub use errors::{
    AccountError, AccountResult, CartError, CartResult, CatalogError, CatalogResult, DomainError,
    OrderError, OrderResult, StoreError, StoreResult,
};
pub use lifecycle::LifecycleManager;
pub use store::{
    DocumentKey, DocumentWrite, ExpectedRevision, Revision, ShopStore, Versioned, WriteBatch,
};
pub use types::{
    CartId, CustomText, EmailAddress, Money, OrderId, PersonName, PhoneNumber, ProductId,
    ProductName, Quantity, StockQuantity, Timestamp, UserId,
};
