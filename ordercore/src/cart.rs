//! Cart management.
//!
//! One cart per user, created lazily on first add. Cart reads resolve
//! line items against the live catalog for display; the durable cart
//! stores only product references, quantities, and customization text.
//! All writes are guarded by the cart document's revision.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::Cart;
use crate::errors::{CartError, CartResult};
use crate::store::{ExpectedRevision, ShopStore, WriteBatch};
use crate::types::{CartId, CustomText, ImageUrl, Money, ProductId, ProductName, Quantity, UserId};

/// A cart line resolved against the live catalog for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartViewItem {
    /// The referenced product.
    pub product_id: ProductId,
    /// Current product name.
    pub name: ProductName,
    /// Current unit price.
    pub price: Money,
    /// Current product images.
    pub images: Vec<ImageUrl>,
    /// Requested units.
    pub quantity: Quantity,
    /// Customization text, if any.
    pub custom_text: Option<CustomText>,
}

/// A user's cart resolved for display.
///
/// A user who has never added anything reads as an empty view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    /// The cart id, when the cart document exists.
    pub cart_id: Option<CartId>,
    /// Resolved line items.
    pub items: Vec<CartViewItem>,
}

impl CartView {
    /// The empty view for users without a cart.
    pub const fn empty() -> Self {
        Self {
            cart_id: None,
            items: Vec::new(),
        }
    }
}

/// The cart service.
#[derive(Debug)]
pub struct CartService<S> {
    store: Arc<S>,
}

impl<S> Clone for CartService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ShopStore> CartService<S> {
    /// Creates a cart service over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add units of a product to the user's cart, creating the cart on
    /// first use. An existing line for the product has its quantity
    /// increased and its custom text replaced when new text is provided.
    #[instrument(skip(self, custom_text), fields(user = %user_id, product = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
        custom_text: Option<CustomText>,
    ) -> CartResult<Cart> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound(product_id));
        }

        let (mut cart, expected) = match self.store.get_cart_by_user(user_id).await? {
            Some(versioned) => (
                versioned.document,
                ExpectedRevision::Exact(versioned.revision),
            ),
            None => (Cart::new(user_id), ExpectedRevision::New),
        };

        cart.add_line(product_id, quantity, custom_text)?;

        self.store
            .commit(WriteBatch::new().put_cart(cart.clone(), expected))
            .await?;
        Ok(cart)
    }

    /// Read the user's cart resolved against the live catalog.
    ///
    /// Lines whose product has since been removed from the catalog are
    /// omitted from the view; they cannot be priced or displayed.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn get_cart(&self, user_id: UserId) -> CartResult<CartView> {
        let Some(versioned) = self.store.get_cart_by_user(user_id).await? else {
            return Ok(CartView::empty());
        };
        let cart = versioned.document;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let Some(product) = self.store.get_product(line.product_id).await? else {
                continue;
            };
            let product = product.document;
            items.push(CartViewItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                images: product.images,
                quantity: line.quantity,
                custom_text: line.custom_text.clone(),
            });
        }

        Ok(CartView {
            cart_id: Some(cart.id),
            items,
        })
    }

    /// Replace a line's quantity and custom text.
    #[instrument(skip(self, custom_text), fields(user = %user_id, product = %product_id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
        custom_text: Option<CustomText>,
    ) -> CartResult<Cart> {
        let versioned = self
            .store
            .get_cart_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound(user_id))?;
        let mut cart = versioned.document;

        if !cart.set_line(product_id, quantity, custom_text) {
            return Err(CartError::ItemNotFound(product_id));
        }

        self.store
            .commit(
                WriteBatch::new()
                    .put_cart(cart.clone(), ExpectedRevision::Exact(versioned.revision)),
            )
            .await?;
        Ok(cart)
    }

    /// Drop a product's line from the cart. Removing a line that is not
    /// there is a no-op, but the user must have a cart.
    #[instrument(skip(self), fields(user = %user_id, product = %product_id))]
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> CartResult<Cart> {
        let versioned = self
            .store
            .get_cart_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound(user_id))?;
        let mut cart = versioned.document;

        cart.remove_line(product_id);

        self.store
            .commit(
                WriteBatch::new()
                    .put_cart(cart.clone(), ExpectedRevision::Exact(versioned.revision)),
            )
            .await?;
        Ok(cart)
    }
}
