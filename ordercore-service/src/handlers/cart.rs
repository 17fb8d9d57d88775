//! Cart endpoints. All require a signed-in user.

use axum::extract::{Path, State};
use axum::Json;
use ordercore::cart::CartView;
use ordercore::domain::Cart;
use ordercore::store::ShopStore;
use ordercore::types::{ProductId, Quantity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::handlers::parse_custom_text;
use crate::state::AppState;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    /// The product to add.
    pub product_id: Uuid,
    /// Units to add.
    pub quantity: u32,
    /// Customization text, optional.
    pub custom_text: Option<String>,
}

/// Body of `PATCH /api/cart/update/{productId}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    /// Replacement quantity.
    pub quantity: u32,
    /// Replacement customization text.
    pub custom_text: Option<String>,
}

/// Response carrying the updated cart and a message.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Outcome message.
    pub message: String,
    /// The cart after the change.
    pub cart: Cart,
}

/// `POST /api/cart/add`
pub async fn add_to_cart<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let quantity =
        Quantity::new(request.quantity).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let custom_text = parse_custom_text(request.custom_text)?;

    let cart = state
        .cart
        .add_item(
            identity.user_id,
            ProductId::from_uuid(request.product_id),
            quantity,
            custom_text,
        )
        .await?;

    Ok(Json(CartResponse {
        message: "Cart updated".to_string(),
        cart,
    }))
}

/// `GET /api/cart`
pub async fn get_cart<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
) -> Result<Json<CartView>, ApiError> {
    let view = state.cart.get_cart(identity.user_id).await?;
    Ok(Json(view))
}

/// `PATCH /api/cart/update/{productId}`
pub async fn update_cart_item<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let quantity =
        Quantity::new(request.quantity).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let custom_text = parse_custom_text(request.custom_text)?;

    let cart = state
        .cart
        .update_item(
            identity.user_id,
            ProductId::from_uuid(product_id),
            quantity,
            custom_text,
        )
        .await?;

    Ok(Json(CartResponse {
        message: "Cart updated".to_string(),
        cart,
    }))
}

/// `DELETE /api/cart/remove/{productId}`
pub async fn remove_cart_item<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .cart
        .remove_item(identity.user_id, ProductId::from_uuid(product_id))
        .await?;

    Ok(Json(CartResponse {
        message: "Item removed from cart".to_string(),
        cart,
    }))
}
