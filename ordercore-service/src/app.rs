//! Router assembly.

use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use ordercore::store::ShopStore;
use serde_json::json;

use crate::handlers::{accounts, cart, orders, products};
use crate::state::AppState;

/// Build the full application router over a store backend.
pub fn create_app<S: ShopStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        // Auth
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        // Catalog
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Cart
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/add", post(cart::add_to_cart))
        .route("/api/cart/update/{product_id}", patch(cart::update_cart_item))
        .route(
            "/api/cart/remove/{product_id}",
            delete(cart::remove_cart_item),
        )
        // Orders
        .route(
            "/api/orders",
            post(orders::place_order).get(orders::list_orders),
        )
        .route(
            "/api/orders/{id}",
            get(orders::get_order).patch(orders::update_order_status),
        )
        .route("/api/orders/cancel/{id}", post(orders::cancel_order))
        // Everything else
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}
