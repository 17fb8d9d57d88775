//! Order Lifecycle Manager.
//!
//! Moves an existing order through its status state machine. Forward
//! transitions (Pending → Processing → Shipped → Delivered) carry no stock
//! side effects; cancellation restocks every line item and must therefore
//! commit the restocks and the status flip together or not at all.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{Order, OrderStatus};
use crate::errors::{OrderError, OrderResult};
use crate::store::{ExpectedRevision, ShopStore, WriteBatch};
use crate::types::{OrderId, Timestamp, UserId};

/// The order lifecycle manager.
///
/// Cheap to clone; state lives entirely in the store.
#[derive(Debug)]
pub struct LifecycleManager<S> {
    store: Arc<S>,
}

impl<S> Clone for LifecycleManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ShopStore> LifecycleManager<S> {
    /// Creates a manager over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Set an order's fulfilment status. Privileged operation; the caller
    /// is trusted to have checked authorization.
    ///
    /// `new_status` must be one of the admin-settable values (Cancelled is
    /// excluded because cancellation restocks), and the move must be
    /// same-or-forward along the fulfilment chain. The write is guarded by
    /// the order's revision, so a racing transition (for example a user
    /// cancel) aborts with [`OrderError::TransactionConflict`].
    #[instrument(skip(self), fields(order = %order_id, status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> OrderResult<Order> {
        if !new_status.is_admin_settable() {
            return Err(OrderError::InvalidStatus(new_status.to_string()));
        }

        let versioned = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let mut order = versioned.document;

        if !order.status.can_become(new_status) {
            return Err(OrderError::InvalidStatus(format!(
                "cannot move from {} to {new_status}",
                order.status
            )));
        }

        order.status = new_status;
        order.updated_at = Timestamp::now();

        self.store
            .commit(
                WriteBatch::new()
                    .put_order(order.clone(), ExpectedRevision::Exact(versioned.revision)),
            )
            .await?;

        debug!("order status updated");
        Ok(order)
    }

    /// Cancel an order on behalf of its owner.
    ///
    /// Only the owning user may cancel, and only while the order is
    /// Pending or Processing. Anything else fails with
    /// [`OrderError::NotCancellable`], including an order that does not
    /// exist or belongs to someone else. Restocking every line item and
    /// flipping the status commit as one batch. A second cancel attempt
    /// finds the order already Cancelled and is rejected, so the restock
    /// can never be applied twice.
    #[instrument(skip(self), fields(order = %order_id, user = %user_id))]
    pub async fn cancel_order(&self, order_id: OrderId, user_id: UserId) -> OrderResult<Order> {
        let Some(versioned) = self.store.get_order(order_id).await? else {
            return Err(OrderError::NotCancellable(order_id));
        };
        let mut order = versioned.document;

        if order.user_id != user_id || !order.status.is_cancellable() {
            return Err(OrderError::NotCancellable(order_id));
        }

        let mut batch = WriteBatch::new();
        for item in &order.items {
            // A product deleted from the catalog since purchase has nothing
            // to restock; the order keeps its snapshot either way.
            let Some(product_versioned) = self.store.get_product(item.product_id).await? else {
                continue;
            };
            let mut product = product_versioned.document;
            product.stock = product
                .stock
                .checked_add(item.quantity)
                .ok_or_else(|| OrderError::Validation("stock overflow on restock".to_string()))?;
            product.touch();
            batch = batch.put_product(product, ExpectedRevision::Exact(product_versioned.revision));
        }

        order.status = OrderStatus::Cancelled;
        order.updated_at = Timestamp::now();
        batch = batch.put_order(order.clone(), ExpectedRevision::Exact(versioned.revision));

        self.store.commit(batch).await?;

        debug!(lines = order.items.len(), "order cancelled and restocked");
        Ok(order)
    }
}
