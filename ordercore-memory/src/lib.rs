//! In-memory adapter for the `OrderCore` shop store.
//!
//! This crate provides an in-memory implementation of the `ShopStore`
//! trait from the ordercore crate, useful for testing and development
//! scenarios where persistence is not required. Commits are atomic and
//! isolated: the whole batch is verified and applied under one write
//! lock, so a failed expectation leaves every collection untouched.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use ordercore::domain::{Cart, Order, Product, User};
use ordercore::errors::{StoreError, StoreResult};
use ordercore::store::{
    DocumentKey, DocumentWrite, ExpectedRevision, Revision, ShopStore, Versioned, WriteBatch,
};
use ordercore::types::{EmailAddress, OrderId, PhoneNumber, ProductId, UserId};

#[derive(Debug, Default)]
struct Collections {
    // BTreeMaps keyed by UUIDv7 ids iterate in insertion-time order.
    products: BTreeMap<ProductId, (Product, Revision)>,
    // One cart per user, keyed by owner.
    carts: HashMap<UserId, (Cart, Revision)>,
    orders: BTreeMap<OrderId, (Order, Revision)>,
    users: HashMap<UserId, (User, Revision)>,
}

impl Collections {
    fn current_revision(&self, write: &DocumentWrite) -> Option<Revision> {
        match write {
            DocumentWrite::PutProduct { product, .. } => {
                self.products.get(&product.id).map(|(_, rev)| *rev)
            }
            DocumentWrite::DeleteProduct { id, .. } => self.products.get(id).map(|(_, rev)| *rev),
            DocumentWrite::PutCart { cart, .. } => self.carts.get(&cart.user_id).map(|(_, rev)| *rev),
            DocumentWrite::PutOrder { order, .. } => self.orders.get(&order.id).map(|(_, rev)| *rev),
            DocumentWrite::PutUser { user, .. } => self.users.get(&user.id).map(|(_, rev)| *rev),
        }
    }
}

/// Thread-safe in-memory shop store for testing and development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShopStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryShopStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn verify(expected: ExpectedRevision, current: Option<Revision>, key: DocumentKey) -> StoreResult<()> {
    match expected {
        ExpectedRevision::New => {
            if current.is_some() {
                return Err(StoreError::DuplicateKey(key.to_string()));
            }
        }
        ExpectedRevision::Exact(revision) => {
            if current != Some(revision) {
                return Err(StoreError::RevisionConflict {
                    key,
                    expected,
                    current,
                });
            }
        }
        ExpectedRevision::Any => {}
    }
    Ok(())
}

fn next_revision(current: Option<Revision>) -> Revision {
    match current {
        Some(revision) => revision.next(),
        None => Revision::initial(),
    }
}

#[async_trait]
impl ShopStore for InMemoryShopStore {
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Versioned<Product>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .products
            .get(&id)
            .map(|(product, revision)| Versioned::new(product.clone(), *revision)))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .products
            .values()
            .map(|(product, _)| product.clone())
            .collect())
    }

    async fn get_cart_by_user(&self, user_id: UserId) -> StoreResult<Option<Versioned<Cart>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .carts
            .get(&user_id)
            .map(|(cart, revision)| Versioned::new(cart.clone(), *revision)))
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Versioned<Order>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .orders
            .get(&id)
            .map(|(order, revision)| Versioned::new(order.clone(), *revision)))
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        // Key order is creation order for UUIDv7 ids; reverse for newest first.
        Ok(collections
            .orders
            .values()
            .filter(|(order, _)| order.user_id == user_id)
            .rev()
            .map(|(order, _)| order.clone())
            .collect())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<Versioned<User>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .users
            .get(&id)
            .map(|(user, revision)| Versioned::new(user.clone(), *revision)))
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Option<Versioned<User>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .map(|(user, revision)| Versioned::new(user.clone(), *revision)))
    }

    async fn find_user_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> StoreResult<Option<Versioned<User>>> {
        let collections = self.collections.read().expect("RwLock poisoned");
        Ok(collections
            .users
            .values()
            .find(|(user, _)| &user.phone == phone)
            .map(|(user, revision)| Versioned::new(user.clone(), *revision)))
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut collections = self.collections.write().expect("RwLock poisoned");

        // First, verify every expectation; nothing is applied on failure.
        for write in batch.writes() {
            verify(write.expected(), collections.current_revision(write), write.key())?;
        }

        // All expectations hold; apply the writes.
        for write in batch.into_writes() {
            let revision = next_revision(collections.current_revision(&write));
            match write {
                DocumentWrite::PutProduct { product, .. } => {
                    collections.products.insert(product.id, (product, revision));
                }
                DocumentWrite::DeleteProduct { id, .. } => {
                    collections.products.remove(&id);
                }
                DocumentWrite::PutCart { cart, .. } => {
                    collections.carts.insert(cart.user_id, (cart, revision));
                }
                DocumentWrite::PutOrder { order, .. } => {
                    collections.orders.insert(order.id, (order, revision));
                }
                DocumentWrite::PutUser { user, .. } => {
                    collections.users.insert(user.id, (user, revision));
                }
            }
        }

        Ok(())
    }
}
