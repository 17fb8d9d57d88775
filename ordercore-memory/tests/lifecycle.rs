//! Behavioural tests for the order lifecycle manager: status updates,
//! cancellation with restock, and the terminal-state rules.

mod common;

use common::{seed_cart, seed_product, shipping_address, stock_of, store};
use ordercore::domain::{OrderStatus, PaymentMethod};
use ordercore::engine::PlacementEngine;
use ordercore::errors::OrderError;
use ordercore::lifecycle::LifecycleManager;
use ordercore::store::{ExpectedRevision, ShopStore, WriteBatch};
use ordercore::types::{OrderId, UserId};

async fn placed_order(
    store: &std::sync::Arc<ordercore_memory::InMemoryShopStore>,
    user: UserId,
    quantity: u32,
) -> (ordercore::domain::Order, ordercore::domain::Product) {
    let product = seed_product(store, "Walnut Desk Organizer", "60", 10).await;
    seed_cart(store, user, &[(product.id, quantity)]).await;
    let engine = PlacementEngine::new(store.clone());
    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();
    (order, product)
}

#[tokio::test]
async fn admin_can_advance_status() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();
    let (order, _) = placed_order(&store, user, 2).await;

    let updated = lifecycle
        .update_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Processing);

    let updated = lifecycle
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    let updated = lifecycle
        .update_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn status_cannot_move_backwards() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();
    let (order, _) = placed_order(&store, user, 2).await;

    lifecycle
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();

    let err = lifecycle
        .update_status(order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}

#[tokio::test]
async fn cancelled_cannot_be_set_through_update_status() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();
    let (order, _) = placed_order(&store, user, 2).await;

    let err = lifecycle
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());

    let err = lifecycle
        .update_status(OrderId::new(), OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}

#[tokio::test]
async fn cancel_restocks_and_rejects_a_second_attempt() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();

    // Scenario D: a Processing order with qty 3 restocks on cancel.
    let (order, product) = placed_order(&store, user, 3).await;
    lifecycle
        .update_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(stock_of(&store, product.id).await, 7);

    let cancelled = lifecycle.cancel_order(order.id, user).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&store, product.id).await, 10);

    // Idempotent-rejecting: a second cancel fails and restocks nothing.
    let err = lifecycle.cancel_order(order.id, user).await.unwrap_err();
    assert!(matches!(err, OrderError::NotCancellable(_)));
    assert_eq!(stock_of(&store, product.id).await, 10);
}

#[tokio::test]
async fn shipped_orders_cannot_be_cancelled() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();

    // Scenario E.
    let (order, product) = placed_order(&store, user, 2).await;
    lifecycle
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();

    let err = lifecycle.cancel_order(order.id, user).await.unwrap_err();
    assert!(matches!(err, OrderError::NotCancellable(_)));
    assert_eq!(stock_of(&store, product.id).await, 8);
}

#[tokio::test]
async fn only_the_owner_can_cancel() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let owner = UserId::new();
    let stranger = UserId::new();
    let (order, product) = placed_order(&store, owner, 2).await;

    let err = lifecycle.cancel_order(order.id, stranger).await.unwrap_err();
    assert!(matches!(err, OrderError::NotCancellable(_)));
    assert_eq!(stock_of(&store, product.id).await, 8);
}

#[tokio::test]
async fn cancelling_a_missing_order_is_not_cancellable() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());

    let err = lifecycle
        .cancel_order(OrderId::new(), UserId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotCancellable(_)));
}

#[tokio::test]
async fn cancel_skips_restock_for_deleted_products() {
    let store = store();
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();
    let (order, product) = placed_order(&store, user, 2).await;

    // The product leaves the catalog after purchase.
    let versioned = store.get_product(product.id).await.unwrap().unwrap();
    store
        .commit(
            WriteBatch::new().delete_product(product.id, ExpectedRevision::Exact(versioned.revision)),
        )
        .await
        .unwrap();

    let cancelled = lifecycle.cancel_order(order.id, user).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(store.get_product(product.id).await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_restocks_every_line_of_a_multi_product_order() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let lifecycle = LifecycleManager::new(store.clone());
    let user = UserId::new();

    let a = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    let b = seed_product(&store, "Brass Lamp", "80", 6).await;
    seed_cart(&store, user, &[(a.id, 4), (b.id, 1)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(stock_of(&store, a.id).await, 6);
    assert_eq!(stock_of(&store, b.id).await, 5);

    lifecycle.cancel_order(order.id, user).await.unwrap();
    assert_eq!(stock_of(&store, a.id).await, 10);
    assert_eq!(stock_of(&store, b.id).await, 6);
}
