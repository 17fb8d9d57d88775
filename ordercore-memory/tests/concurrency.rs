//! Concurrency tests: revision-guarded commits must prevent oversell,
//! double submission, and racing lifecycle transitions.

mod common;

use std::sync::Arc;

use common::{cart_len, seed_cart, seed_product, shipping_address, stock_of, store};
use ordercore::domain::{OrderStatus, PaymentMethod};
use ordercore::engine::PlacementEngine;
use ordercore::errors::OrderError;
use ordercore::lifecycle::LifecycleManager;
use ordercore::store::ShopStore;
use ordercore::types::UserId;
use tokio::sync::Barrier;

#[tokio::test]
async fn concurrent_buyers_cannot_oversell_the_last_unit() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());

    let product = seed_product(&store, "Brass Lamp", "150", 1).await;
    let buyer_a = UserId::new();
    let buyer_b = UserId::new();
    seed_cart(&store, buyer_a, &[(product.id, 1)]).await;
    seed_cart(&store, buyer_b, &[(product.id, 1)]).await;

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for buyer in [buyer_a, buyer_b] {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine
                .place_order(buyer, shipping_address(), PaymentMethod::Card)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            // The loser either lost the revision race at commit or read
            // the already-drained stock.
            Err(OrderError::TransactionConflict { .. } | OrderError::ItemsOutOfStock { .. }) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(stock_of(&store, product.id).await, 0);
}

#[tokio::test]
async fn double_submission_of_the_same_cart_places_one_order() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    let user = UserId::new();
    seed_cart(&store, user, &[(product.id, 2)]).await;

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine
                .place_order(user, shipping_address(), PaymentMethod::Card)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            // The loser either lost the cart revision race or found the
            // cart already emptied.
            Err(OrderError::TransactionConflict { .. } | OrderError::EmptyCart) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(stock_of(&store, product.id).await, 8);
    assert_eq!(cart_len(&store, user).await, 0);
    assert_eq!(store.list_orders_by_user(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_racing_ship_resolves_consistently() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let lifecycle = LifecycleManager::new(store.clone());

    let product = seed_product(&store, "Brass Lamp", "150", 5).await;
    let user = UserId::new();
    seed_cart(&store, user, &[(product.id, 2)]).await;
    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(stock_of(&store, product.id).await, 3);

    let barrier = Arc::new(Barrier::new(2));

    let ship = {
        let lifecycle = lifecycle.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            lifecycle.update_status(order.id, OrderStatus::Shipped).await
        })
    };
    let cancel = {
        let lifecycle = lifecycle.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            lifecycle.cancel_order(order.id, user).await
        })
    };

    let shipped = ship.await.unwrap().is_ok();
    let cancelled = cancel.await.unwrap().is_ok();
    assert!(shipped ^ cancelled, "exactly one transition must win");

    let final_order = store
        .get_order(order.id)
        .await
        .unwrap()
        .unwrap()
        .document;
    if cancelled {
        assert_eq!(final_order.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&store, product.id).await, 5);
    } else {
        assert_eq!(final_order.status, OrderStatus::Shipped);
        assert_eq!(stock_of(&store, product.id).await, 3);
    }
}

#[tokio::test]
async fn many_buyers_never_decrement_below_zero() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());

    let initial_stock = 3;
    let product = seed_product(&store, "Linen Cushion", "200", initial_stock).await;

    let buyers: Vec<UserId> = (0..8).map(|_| UserId::new()).collect();
    for buyer in &buyers {
        seed_cart(&store, *buyer, &[(product.id, 1)]).await;
    }

    let barrier = Arc::new(Barrier::new(buyers.len()));
    let mut handles = Vec::new();
    for buyer in buyers {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine
                .place_order(buyer, shipping_address(), PaymentMethod::Card)
                .await
        }));
    }

    let mut successes = 0u32;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // The sum of decrements never exceeds the pre-transaction stock.
    assert!(successes <= initial_stock);
    assert_eq!(
        stock_of(&store, product.id).await,
        initial_stock - successes
    );
}
