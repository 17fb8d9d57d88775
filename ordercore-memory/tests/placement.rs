//! Behavioural tests for the order placement engine.
//!
//! These cover the documented placement scenarios: successful placement
//! with stock decrement and cart clearing, the all-or-nothing handling of
//! short stock, the minimum order amount, and atomicity of every failure
//! path.

mod common;

use common::{cart_len, seed_cart, seed_product, shipping_address, stock_of, store};
use ordercore::domain::{OrderStatus, PaymentMethod, PaymentStatus};
use ordercore::engine::PlacementEngine;
use ordercore::errors::OrderError;
use ordercore::store::{ExpectedRevision, ShopStore, WriteBatch};
use ordercore::types::UserId;

#[tokio::test]
async fn placing_an_order_decrements_stock_totals_and_empties_cart() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    // Scenario A: qty 2 of a 60-unit product from stock 5.
    let product = seed_product(&store, "Walnut Desk Organizer", "60", 5).await;
    let cart = seed_cart(&store, user, &[(product.id, 2)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(order.user_id, user);
    assert_eq!(order.cart_id, cart.id);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity.value(), 2);
    assert_eq!(order.total.to_minor_units(), 12_000);
    assert_eq!(order.status, OrderStatus::Pending);

    assert_eq!(stock_of(&store, product.id).await, 3);
    assert_eq!(cart_len(&store, user).await, 0);

    // The cart document survives, emptied.
    assert!(store.get_cart_by_user(user).await.unwrap().is_some());
}

#[tokio::test]
async fn order_items_snapshot_name_image_and_price() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Brass Lamp", "150", 4).await;
    seed_cart(&store, user, &[(product.id, 1)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Upi)
        .await
        .unwrap();

    let line = &order.items[0];
    assert_eq!(line.product_id, product.id);
    assert_eq!(line.name, product.name);
    assert_eq!(line.image.as_ref(), product.images.first());
    assert_eq!(line.unit_price, product.price);
}

#[tokio::test]
async fn short_stock_blocks_the_whole_order() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    // Scenario B: qty 10 requested, 2 in stock.
    let product = seed_product(&store, "Ceramic Mug", "60", 2).await;
    seed_cart(&store, user, &[(product.id, 10)]).await;

    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();

    match err {
        OrderError::ItemsOutOfStock { product_names } => {
            assert_eq!(product_names, vec![product.name.clone()]);
        }
        other => panic!("expected ItemsOutOfStock, got {other:?}"),
    }

    assert_eq!(stock_of(&store, product.id).await, 2);
    assert_eq!(cart_len(&store, user).await, 1);
}

#[tokio::test]
async fn out_of_stock_list_names_every_short_product() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let in_stock = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    let short_a = seed_product(&store, "Brass Lamp", "60", 1).await;
    let short_b = seed_product(&store, "Linen Cushion", "60", 0).await;
    seed_cart(
        &store,
        user,
        &[(in_stock.id, 2), (short_a.id, 5), (short_b.id, 1)],
    )
    .await;

    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();

    match err {
        OrderError::ItemsOutOfStock { product_names } => {
            assert_eq!(
                product_names,
                vec![short_a.name.clone(), short_b.name.clone()]
            );
        }
        other => panic!("expected ItemsOutOfStock, got {other:?}"),
    }

    // All-or-nothing: the in-stock line was not fulfilled either.
    assert_eq!(stock_of(&store, in_stock.id).await, 10);
    assert_eq!(stock_of(&store, short_a.id).await, 1);
    assert_eq!(cart_len(&store, user).await, 3);
    assert!(store.list_orders_by_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn totals_below_minimum_are_rejected_without_side_effects() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    // Scenario C: total 50, minimum 100.
    let product = seed_product(&store, "Postcard Set", "50", 5).await;
    seed_cart(&store, user, &[(product.id, 1)]).await;

    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();

    match err {
        OrderError::BelowMinimumOrder { total, minimum } => {
            assert_eq!(total.to_minor_units(), 5_000);
            assert_eq!(minimum.to_minor_units(), 10_000);
        }
        other => panic!("expected BelowMinimumOrder, got {other:?}"),
    }

    assert_eq!(stock_of(&store, product.id).await, 5);
    assert_eq!(cart_len(&store, user).await, 1);
}

#[tokio::test]
async fn exactly_the_minimum_total_is_accepted() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Postcard Set", "100", 5).await;
    seed_cart(&store, user, &[(product.id, 1)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(order.total.to_minor_units(), 10_000);
}

#[tokio::test]
async fn missing_and_empty_carts_are_rejected() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    // No cart document at all.
    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));

    // A cart document with no lines.
    seed_cart(&store, user, &[]).await;
    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));
}

#[tokio::test]
async fn cod_orders_start_with_pending_payment() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    seed_cart(&store, user, &[(product.id, 2)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::Cod)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn prepaid_orders_start_with_completed_payment() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    seed_cart(&store, user, &[(product.id, 2)]).await;

    let order = engine
        .place_order(user, shipping_address(), PaymentMethod::NetBanking)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn vanished_cart_product_is_a_storage_failure() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    seed_cart(&store, user, &[(product.id, 2)]).await;

    // The product disappears from the catalog before placement.
    let versioned = store.get_product(product.id).await.unwrap().unwrap();
    store
        .commit(
            WriteBatch::new().delete_product(product.id, ExpectedRevision::Exact(versioned.revision)),
        )
        .await
        .unwrap();

    let err = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Storage(_)));
    assert_eq!(cart_len(&store, user).await, 1);
}

#[tokio::test]
async fn orders_list_newest_first() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let user = UserId::new();

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 100).await;

    seed_cart(&store, user, &[(product.id, 2)]).await;
    let first = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();

    seed_cart(&store, user, &[(product.id, 3)]).await;
    let second = engine
        .place_order(user, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();

    let listed = engine.orders_for_user(user).await.unwrap();
    assert_eq!(
        listed.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
}

#[tokio::test]
async fn orders_are_visible_only_to_their_owner() {
    let store = store();
    let engine = PlacementEngine::new(store.clone());
    let owner = UserId::new();
    let stranger = UserId::new();

    let product = seed_product(&store, "Walnut Desk Organizer", "60", 10).await;
    seed_cart(&store, owner, &[(product.id, 2)]).await;
    let order = engine
        .place_order(owner, shipping_address(), PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(
        engine.order_for_user(order.id, owner).await.unwrap().id,
        order.id
    );
    assert!(matches!(
        engine.order_for_user(order.id, stranger).await.unwrap_err(),
        OrderError::OrderNotFound(_)
    ));
}
