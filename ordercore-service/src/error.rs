//! Error mapping from core errors onto the HTTP status table.
//!
//! 4xx responses carry the error kind's message verbatim (plus the
//! structured out-of-stock list when present); 5xx responses carry a
//! generic message and the detail goes to the log only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ordercore::errors::{AccountError, CartError, CatalogError, OrderError};
use serde::Serialize;
use tracing::error;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub message: String,
    /// Names of out-of-stock products, when that is what failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_stock_items: Option<Vec<String>>,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// An error with a status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                out_of_stock_items: None,
            },
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 for missing or invalid credentials.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    /// 403 for authenticated callers without the needed role.
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Admin access required")
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with a generic message; the detail is logged, not returned.
    pub fn internal<E: std::fmt::Display>(detail: E) -> Self {
        error!(%detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }

    /// The response status.
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ItemsOutOfStock { ref product_names } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody {
                    message: "Some items are out of stock".to_string(),
                    out_of_stock_items: Some(
                        product_names.iter().map(ToString::to_string).collect(),
                    ),
                },
            },
            OrderError::InvalidAddress(_)
            | OrderError::InvalidPaymentMethod(_)
            | OrderError::EmptyCart
            | OrderError::BelowMinimumOrder { .. }
            | OrderError::InvalidStatus(_)
            | OrderError::NotCancellable(_)
            | OrderError::Validation(_) => Self::bad_request(err.to_string()),
            OrderError::OrderNotFound(_) => Self::not_found(err.to_string()),
            OrderError::TransactionConflict { .. } | OrderError::DuplicateOrder => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            OrderError::Storage(detail) => Self::internal(detail),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(_)
            | CartError::CartNotFound(_)
            | CartError::ItemNotFound(_) => Self::not_found(err.to_string()),
            CartError::Validation(_) => Self::bad_request(err.to_string()),
            CartError::Conflict(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            CartError::Storage(detail) => Self::internal(detail),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(_) => Self::not_found(err.to_string()),
            CatalogError::Validation(_) => Self::bad_request(err.to_string()),
            CatalogError::Conflict(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            CatalogError::Storage(detail) => Self::internal(detail),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken
            | AccountError::PhoneTaken
            | AccountError::InvalidCredentials
            | AccountError::Validation(_) => Self::bad_request(err.to_string()),
            AccountError::Conflict(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            AccountError::Storage(detail) => Self::internal(detail),
        }
    }
}
