//! Order endpoints: placement, listing, status updates, cancellation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ordercore::domain::{Order, OrderStatus, PaymentMethod};
use ordercore::errors::OrderError;
use ordercore::store::ShopStore;
use ordercore::types::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AdminIdentity, Identity};
use crate::error::ApiError;
use crate::handlers::AddressDto;
use crate::state::AppState;

/// Body of `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Shipping destination.
    pub shipping_address: AddressDto,
    /// Payment method name: COD, Card, UPI, or NetBanking.
    pub payment_method: String,
}

/// Body of `PATCH /api/orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// The new fulfilment status.
    pub status: String,
}

/// Response carrying one order and a message.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Outcome message.
    pub message: String,
    /// The order.
    pub order: Order,
}

/// Response of `GET /api/orders`.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    /// Number of orders.
    pub count: usize,
    /// The caller's orders, newest first.
    pub orders: Vec<Order>,
}

/// Response of `POST /api/orders/cancel/{id}`.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    /// Outcome message.
    pub message: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, ApiError> {
    match raw {
        "Pending" => Ok(OrderStatus::Pending),
        "Processing" => Ok(OrderStatus::Processing),
        "Shipped" => Ok(OrderStatus::Shipped),
        "Delivered" => Ok(OrderStatus::Delivered),
        "Cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(ApiError::from(OrderError::InvalidStatus(other.to_string()))),
    }
}

/// `POST /api/orders`
pub async fn place_order<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let shipping_address = request.shipping_address.into_domain()?;
    let payment_method: PaymentMethod = request
        .payment_method
        .parse()
        .map_err(|_| ApiError::from(OrderError::InvalidPaymentMethod(request.payment_method)))?;

    let order = state
        .engine
        .place_order(identity.user_id, shipping_address, payment_method)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order placed successfully".to_string(),
            order,
        }),
    ))
}

/// `GET /api/orders`
pub async fn list_orders<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.engine.orders_for_user(identity.user_id).await?;
    Ok(Json(OrderListResponse {
        count: orders.len(),
        orders,
    }))
}

/// `GET /api/orders/{id}`
pub async fn get_order<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .engine
        .order_for_user(OrderId::from_uuid(id), identity.user_id)
        .await?;
    Ok(Json(order))
}

/// `PATCH /api/orders/{id}` (admin)
pub async fn update_order_status<S: ShopStore + 'static>(
    _admin: AdminIdentity,
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status = parse_status(&request.status)?;
    let order = state
        .lifecycle
        .update_status(OrderId::from_uuid(id), status)
        .await?;

    Ok(Json(OrderResponse {
        message: "Order status updated".to_string(),
        order,
    }))
}

/// `POST /api/orders/cancel/{id}`
pub async fn cancel_order<S: ShopStore + 'static>(
    identity: Identity,
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, ApiError> {
    state
        .lifecycle
        .cancel_order(OrderId::from_uuid(id), identity.user_id)
        .await?;

    Ok(Json(CancelResponse {
        message: "Order cancelled successfully".to_string(),
    }))
}
