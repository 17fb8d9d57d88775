//! Order Placement Engine.
//!
//! [`PlacementEngine::place_order`] turns a cart into an order as one
//! atomic unit: validate every line against live stock, stage the stock
//! decrements and price snapshots, then commit products, order, and the
//! emptied cart in a single [`WriteBatch`]. Nothing is written until the
//! whole cart has been judged, and a failed commit leaves cart and stock
//! exactly as they were.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config;
use crate::domain::{Order, OrderLineItem, PaymentMethod, ShippingAddress};
use crate::errors::{OrderError, OrderResult, StoreError};
use crate::store::{DocumentKey, ExpectedRevision, ShopStore, WriteBatch};
use crate::types::{Money, OrderId, ProductName, UserId};

/// The order placement engine.
///
/// Cheap to clone; state lives entirely in the store.
#[derive(Debug)]
pub struct PlacementEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for PlacementEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ShopStore> PlacementEngine<S> {
    /// Creates an engine over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Place an order from the user's current cart.
    ///
    /// The whole sequence (read cart, check and decrement stock per line,
    /// snapshot prices, persist the order, empty the cart) commits
    /// atomically. Every line is processed before the abort decision so
    /// [`OrderError::ItemsOutOfStock`] names all short products, not just
    /// the first.
    ///
    /// A cart containing even one insufficiently stocked line blocks the
    /// whole order; nothing is partially fulfilled. Concurrent placements
    /// touching the same cart or products surface as
    /// [`OrderError::TransactionConflict`]; the engine never retries on
    /// its own.
    #[instrument(skip(self, shipping_address), fields(user = %user_id, payment = %payment_method))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> OrderResult<Order> {
        let Some(cart) = self.store.get_cart_by_user(user_id).await? else {
            return Err(OrderError::EmptyCart);
        };
        let cart_revision = cart.revision;
        let mut cart = cart.document;
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut out_of_stock: Vec<ProductName> = Vec::new();
        let mut items: Vec<OrderLineItem> = Vec::new();
        let mut staged_products = Vec::new();
        let mut total = Money::zero();

        // Process every line before deciding; the out-of-stock list must
        // name all short products.
        for line in &cart.items {
            let Some(versioned) = self.store.get_product(line.product_id).await? else {
                return Err(OrderError::Storage(StoreError::DocumentNotFound(
                    DocumentKey::Product(line.product_id),
                )));
            };
            let mut product = versioned.document;

            let Some(remaining) = product.stock.checked_sub(line.quantity) else {
                out_of_stock.push(product.name.clone());
                continue;
            };

            product.stock = remaining;
            product.touch();

            let item = OrderLineItem::snapshot(&product, line.quantity);
            total = total.checked_add(item.subtotal()?)?;
            items.push(item);
            staged_products.push((product, versioned.revision));
        }

        if !out_of_stock.is_empty() {
            debug!(short = out_of_stock.len(), "aborting: lines short on stock");
            return Err(OrderError::ItemsOutOfStock {
                product_names: out_of_stock,
            });
        }

        if total.amount() < config::MINIMUM_ORDER_TOTAL {
            return Err(OrderError::BelowMinimumOrder {
                total,
                minimum: config::minimum_order_total(),
            });
        }

        let order = Order::new(
            user_id,
            cart.id,
            items,
            shipping_address,
            payment_method,
            total,
        );
        cart.clear();

        let mut batch = WriteBatch::new();
        for (product, revision) in staged_products {
            batch = batch.put_product(product, ExpectedRevision::Exact(revision));
        }
        batch = batch
            .put_order(order.clone(), ExpectedRevision::New)
            .put_cart(cart, ExpectedRevision::Exact(cart_revision));

        self.store.commit(batch).await?;

        debug!(order = %order.id, total = %order.total, "order placed");
        Ok(order)
    }

    /// List the user's orders, newest first.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn orders_for_user(&self, user_id: UserId) -> OrderResult<Vec<Order>> {
        Ok(self.store.list_orders_by_user(user_id).await?)
    }

    /// Fetch a single order, visible only to its owner.
    ///
    /// An order that exists but belongs to someone else reads as not
    /// found, exactly like an order that does not exist.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn order_for_user(&self, order_id: OrderId, user_id: UserId) -> OrderResult<Order> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .map(|versioned| versioned.document)
            .filter(|order| order.user_id == user_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        Ok(order)
    }
}
