//! Catalog management: admin-driven product CRUD.
//!
//! Stock is also mutated by the placement engine (decrement) and the
//! lifecycle manager (restock on cancel); both go through the same
//! revision-guarded commit, so an admin edit racing a placement aborts
//! one side instead of losing an update.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::Product;
use crate::errors::{CatalogError, CatalogResult};
use crate::store::{ExpectedRevision, ShopStore, WriteBatch};
use crate::types::{ImageUrl, Money, ProductId, ProductName, StockQuantity};

/// Fields of a product to be created.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Product name.
    pub name: ProductName,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Initial stock level.
    pub stock: StockQuantity,
    /// Ordered image URIs.
    pub images: Vec<ImageUrl>,
    /// Optional category label.
    pub category: Option<String>,
}

/// Partial update of a product; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// Replacement name.
    pub name: Option<ProductName>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement price.
    pub price: Option<Money>,
    /// Replacement stock level.
    pub stock: Option<StockQuantity>,
    /// Replacement image list.
    pub images: Option<Vec<ImageUrl>>,
    /// Replacement category.
    pub category: Option<String>,
}

/// The product catalog service.
#[derive(Debug)]
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ShopStore> CatalogService<S> {
    /// Creates a catalog service over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add a product to the catalog.
    #[instrument(skip(self, new))]
    pub async fn create(&self, new: NewProduct) -> CatalogResult<Product> {
        let product = Product::new(
            new.name,
            new.description,
            new.price,
            new.stock,
            new.images,
            new.category,
        );
        self.store
            .commit(WriteBatch::new().put_product(product.clone(), ExpectedRevision::New))
            .await?;
        Ok(product)
    }

    /// List all products.
    pub async fn list(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// Fetch a product by id.
    pub async fn get(&self, id: ProductId) -> CatalogResult<Product> {
        self.store
            .get_product(id)
            .await?
            .map(|versioned| versioned.document)
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Apply a partial update to a product.
    #[instrument(skip(self, update), fields(product = %id))]
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> CatalogResult<Product> {
        let versioned = self
            .store
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        let mut product = versioned.document;

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        if let Some(images) = update.images {
            product.images = images;
        }
        if let Some(category) = update.category {
            product.category = Some(category);
        }
        product.touch();

        self.store
            .commit(
                WriteBatch::new()
                    .put_product(product.clone(), ExpectedRevision::Exact(versioned.revision)),
            )
            .await?;
        Ok(product)
    }

    /// Remove a product from the catalog, returning its last state.
    ///
    /// Orders that already snapshotted the product are unaffected;
    /// cancelling one of them simply skips the vanished product's restock.
    #[instrument(skip(self), fields(product = %id))]
    pub async fn delete(&self, id: ProductId) -> CatalogResult<Product> {
        let versioned = self
            .store
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        self.store
            .commit(
                WriteBatch::new().delete_product(id, ExpectedRevision::Exact(versioned.revision)),
            )
            .await?;
        Ok(versioned.document)
    }
}
