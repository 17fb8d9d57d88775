//! Product catalog endpoints. Reads are public; writes are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ordercore::catalog::{NewProduct, ProductUpdate};
use ordercore::domain::Product;
use ordercore::store::ShopStore;
use ordercore::types::{ImageUrl, Money, ProductId, ProductName, StockQuantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AdminIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Product name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Initial stock level.
    #[serde(default)]
    pub stock_quantity: u32,
    /// Image URIs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Category label.
    pub category: Option<String>,
}

/// Body of `PUT /api/products/{id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement price.
    pub price: Option<Decimal>,
    /// Replacement stock level.
    pub stock_quantity: Option<u32>,
    /// Replacement image list.
    pub images: Option<Vec<String>>,
    /// Replacement category.
    pub category: Option<String>,
}

/// Response carrying one product and a message.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Outcome message.
    pub message: String,
    /// The product.
    pub product: Product,
}

/// Response of `GET /api/products`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    /// Number of products.
    pub count: usize,
    /// The products.
    pub products: Vec<Product>,
}

/// Response of `DELETE /api/products/{id}`.
#[derive(Debug, Serialize)]
pub struct ProductDeletedResponse {
    /// Outcome message.
    pub message: String,
    /// Name of the removed product.
    pub product: String,
}

fn parse_images(raw: Vec<String>) -> Result<Vec<ImageUrl>, ApiError> {
    raw.into_iter()
        .map(|uri| ImageUrl::try_new(uri).map_err(|e| ApiError::bad_request(e.to_string())))
        .collect()
}

/// `POST /api/products` (admin)
pub async fn create_product<S: ShopStore + 'static>(
    _admin: AdminIdentity,
    State(state): State<AppState<S>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let name =
        ProductName::try_new(request.name).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let price = Money::new(request.price).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let images = parse_images(request.images)?;

    let product = state
        .catalog
        .create(NewProduct {
            name,
            description: request.description,
            price,
            stock: StockQuantity::new(request.stock_quantity),
            images,
            category: request.category,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product created".to_string(),
            product,
        }),
    ))
}

/// `GET /api/products`
pub async fn list_products<S: ShopStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(ProductListResponse {
        count: products.len(),
        products,
    }))
}

/// `GET /api/products/{id}`
pub async fn get_product<S: ShopStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get(ProductId::from_uuid(id)).await?;
    Ok(Json(product))
}

/// `PUT /api/products/{id}` (admin)
pub async fn update_product<S: ShopStore + 'static>(
    _admin: AdminIdentity,
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let name = request
        .name
        .map(ProductName::try_new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let price = request
        .price
        .map(Money::new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let images = request.images.map(parse_images).transpose()?;

    let product = state
        .catalog
        .update(
            ProductId::from_uuid(id),
            ProductUpdate {
                name,
                description: request.description,
                price,
                stock: request.stock_quantity.map(StockQuantity::new),
                images,
                category: request.category,
            },
        )
        .await?;

    Ok(Json(ProductResponse {
        message: "Product updated".to_string(),
        product,
    }))
}

/// `DELETE /api/products/{id}` (admin)
pub async fn delete_product<S: ShopStore + 'static>(
    _admin: AdminIdentity,
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDeletedResponse>, ApiError> {
    let product = state.catalog.delete(ProductId::from_uuid(id)).await?;
    Ok(Json(ProductDeletedResponse {
        message: "Product deleted".to_string(),
        product: product.name.to_string(),
    }))
}
