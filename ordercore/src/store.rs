//! Store abstraction for the `OrderCore` library.
//!
//! This module defines the [`ShopStore`] trait that serves as the port
//! interface for different storage backends. The trait is designed to be
//! backend-independent and to support multi-document atomic commits:
//! every read returns the document together with its [`Revision`], and
//! every write goes through [`ShopStore::commit`] as part of a
//! [`WriteBatch`] whose per-document [`ExpectedRevision`]s are verified
//! before anything is applied.
//!
//! That optimistic pattern is what makes the order placement workflow
//! safe under concurrency: a stock decrement staged against revision `n`
//! can only commit while the product is still at revision `n`, so two
//! buyers racing for the last unit cannot both win.

use async_trait::async_trait;
use nutype::nutype;
use std::fmt::Display;

use crate::domain::{Cart, Order, Product, User};
use crate::errors::StoreResult;
use crate::types::{CartId, EmailAddress, OrderId, PhoneNumber, ProductId, UserId};

/// The revision of a document within its collection.
///
/// Revisions start at 0 and increment monotonically with each committed
/// write. The type system ensures revisions can never be negative.
#[nutype(
    validate(greater_or_equal = 0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct Revision(u64);

impl Revision {
    /// The revision a freshly inserted document gets.
    pub fn initial() -> Self {
        Self::try_new(0).expect("0 is always a valid revision")
    }

    /// Returns the next revision after this one.
    #[must_use]
    pub fn next(self) -> Self {
        let current: u64 = self.into();
        Self::try_new(current + 1).expect("next revision should always be valid")
    }
}

/// Concurrency expectation attached to a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedRevision {
    /// The document must not exist yet; the write is an insert.
    New,
    /// The document must currently be at exactly this revision.
    Exact(Revision),
    /// No expectation; last writer wins.
    Any,
}

/// A document read together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The document itself.
    pub document: T,
    /// The revision the document was at when read.
    pub revision: Revision,
}

impl<T> Versioned<T> {
    /// Pairs a document with its revision.
    pub const fn new(document: T, revision: Revision) -> Self {
        Self { document, revision }
    }
}

/// Identity of a document across all collections, used in conflict and
/// not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    /// A user document.
    User(UserId),
    /// A product document.
    Product(ProductId),
    /// A cart document.
    Cart(CartId),
    /// An order document.
    Order(OrderId),
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user/{id}"),
            Self::Product(id) => write!(f, "product/{id}"),
            Self::Cart(id) => write!(f, "cart/{id}"),
            Self::Order(id) => write!(f, "order/{id}"),
        }
    }
}

/// A single guarded write within a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum DocumentWrite {
    /// Insert or replace a product.
    PutProduct {
        /// The new document state.
        product: Product,
        /// The revision expectation.
        expected: ExpectedRevision,
    },
    /// Remove a product from the catalog.
    DeleteProduct {
        /// The product to delete.
        id: ProductId,
        /// The revision expectation.
        expected: ExpectedRevision,
    },
    /// Insert or replace a cart.
    PutCart {
        /// The new document state.
        cart: Cart,
        /// The revision expectation.
        expected: ExpectedRevision,
    },
    /// Insert or replace an order.
    PutOrder {
        /// The new document state.
        order: Order,
        /// The revision expectation.
        expected: ExpectedRevision,
    },
    /// Insert or replace a user.
    PutUser {
        /// The new document state.
        user: User,
        /// The revision expectation.
        expected: ExpectedRevision,
    },
}

impl DocumentWrite {
    /// The key of the document this write targets.
    pub const fn key(&self) -> DocumentKey {
        match self {
            Self::PutProduct { product, .. } => DocumentKey::Product(product.id),
            Self::DeleteProduct { id, .. } => DocumentKey::Product(*id),
            Self::PutCart { cart, .. } => DocumentKey::Cart(cart.id),
            Self::PutOrder { order, .. } => DocumentKey::Order(order.id),
            Self::PutUser { user, .. } => DocumentKey::User(user.id),
        }
    }

    /// The revision expectation attached to this write.
    pub const fn expected(&self) -> ExpectedRevision {
        match self {
            Self::PutProduct { expected, .. }
            | Self::DeleteProduct { expected, .. }
            | Self::PutCart { expected, .. }
            | Self::PutOrder { expected, .. }
            | Self::PutUser { expected, .. } => *expected,
        }
    }
}

/// An ordered set of guarded writes committed as one atomic unit.
///
/// Every expectation is verified before any write is applied; a single
/// failed expectation aborts the whole batch with
/// [`crate::errors::StoreError::RevisionConflict`] and leaves the store
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<DocumentWrite>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub const fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// Stage a product write.
    #[must_use]
    pub fn put_product(mut self, product: Product, expected: ExpectedRevision) -> Self {
        self.writes.push(DocumentWrite::PutProduct { product, expected });
        self
    }

    /// Stage a product deletion.
    #[must_use]
    pub fn delete_product(mut self, id: ProductId, expected: ExpectedRevision) -> Self {
        self.writes.push(DocumentWrite::DeleteProduct { id, expected });
        self
    }

    /// Stage a cart write.
    #[must_use]
    pub fn put_cart(mut self, cart: Cart, expected: ExpectedRevision) -> Self {
        self.writes.push(DocumentWrite::PutCart { cart, expected });
        self
    }

    /// Stage an order write.
    #[must_use]
    pub fn put_order(mut self, order: Order, expected: ExpectedRevision) -> Self {
        self.writes.push(DocumentWrite::PutOrder { order, expected });
        self
    }

    /// Stage a user write.
    #[must_use]
    pub fn put_user(mut self, user: User, expected: ExpectedRevision) -> Self {
        self.writes.push(DocumentWrite::PutUser { user, expected });
        self
    }

    /// Whether the batch stages no writes.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// The staged writes, in staging order.
    pub fn writes(&self) -> &[DocumentWrite] {
        &self.writes
    }

    /// Consumes the batch, yielding the staged writes.
    pub fn into_writes(self) -> Vec<DocumentWrite> {
        self.writes
    }
}

/// Port interface over the shop's storage backend.
///
/// Implementations must make [`Self::commit`] atomic and isolated: either
/// every write in the batch is applied, or none is, and concurrent
/// commits touching the same documents must serialize such that stale
/// [`ExpectedRevision::Exact`] expectations fail rather than overwrite.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Read a product by id.
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Versioned<Product>>>;

    /// List all products, in catalog insertion order.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Read the cart owned by a user, if one has been created.
    async fn get_cart_by_user(&self, user_id: UserId) -> StoreResult<Option<Versioned<Cart>>>;

    /// Read an order by id.
    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Versioned<Order>>>;

    /// List a user's orders, newest first.
    async fn list_orders_by_user(&self, user_id: UserId) -> StoreResult<Vec<Order>>;

    /// Read a user by id.
    async fn get_user(&self, id: UserId) -> StoreResult<Option<Versioned<User>>>;

    /// Look a user up by login email.
    async fn find_user_by_email(&self, email: &EmailAddress)
        -> StoreResult<Option<Versioned<User>>>;

    /// Look a user up by phone number.
    async fn find_user_by_phone(&self, phone: &PhoneNumber)
        -> StoreResult<Option<Versioned<User>>>;

    /// Atomically apply a batch of guarded writes.
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()>;
}
