//! Shared fixtures for the behavioural test suites.

// Not every suite uses every fixture.
#![allow(dead_code)]

use std::sync::Arc;

use ordercore::domain::{Cart, Product, ShippingAddress};
use ordercore::store::{ExpectedRevision, ShopStore, WriteBatch};
use ordercore::types::{
    AddressLine, CityName, ImageUrl, Money, ProductId, ProductName, Quantity, StateName,
    StockQuantity, UserId, ZipCode,
};
use ordercore_memory::InMemoryShopStore;

pub fn store() -> Arc<InMemoryShopStore> {
    Arc::new(InMemoryShopStore::new())
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress::new(
        AddressLine::try_new("12 MG Road").unwrap(),
        None,
        CityName::try_new("Bengaluru").unwrap(),
        StateName::try_new("Karnataka").unwrap(),
        ZipCode::try_new("560001").unwrap(),
        None,
    )
}

pub async fn seed_product(
    store: &Arc<InMemoryShopStore>,
    name: &str,
    price: &str,
    stock: u32,
) -> Product {
    let product = Product::new(
        ProductName::try_new(name).unwrap(),
        None,
        price.parse::<Money>().unwrap(),
        StockQuantity::new(stock),
        vec![ImageUrl::try_new("https://img.example/product.jpg").unwrap()],
        None,
    );
    store
        .commit(WriteBatch::new().put_product(product.clone(), ExpectedRevision::New))
        .await
        .unwrap();
    product
}

pub async fn seed_cart(
    store: &Arc<InMemoryShopStore>,
    user_id: UserId,
    lines: &[(ProductId, u32)],
) -> Cart {
    // Reuse an existing cart document (a successful placement empties it
    // rather than deleting it), otherwise create one.
    let (mut cart, expected) = match store.get_cart_by_user(user_id).await.unwrap() {
        Some(versioned) => (
            versioned.document,
            ExpectedRevision::Exact(versioned.revision),
        ),
        None => (Cart::new(user_id), ExpectedRevision::New),
    };
    cart.clear();
    for (product_id, quantity) in lines {
        cart.add_line(*product_id, Quantity::new(*quantity).unwrap(), None)
            .unwrap();
    }
    store
        .commit(WriteBatch::new().put_cart(cart.clone(), expected))
        .await
        .unwrap();
    cart
}

pub async fn stock_of(store: &Arc<InMemoryShopStore>, product_id: ProductId) -> u32 {
    store
        .get_product(product_id)
        .await
        .unwrap()
        .unwrap()
        .document
        .stock
        .value()
}

pub async fn cart_len(store: &Arc<InMemoryShopStore>, user_id: UserId) -> usize {
    store
        .get_cart_by_user(user_id)
        .await
        .unwrap()
        .map_or(0, |versioned| versioned.document.items.len())
}
