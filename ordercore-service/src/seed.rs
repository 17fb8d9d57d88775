//! Development catalog seeding.
//!
//! Populates an empty catalog with randomized products so the service is
//! usable immediately after a fresh start. Skipped when the catalog
//! already has products.

use ordercore::catalog::{CatalogService, NewProduct};
use ordercore::errors::CatalogResult;
use ordercore::store::ShopStore;
use ordercore::types::{ImageUrl, Money, ProductName, StockQuantity};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::info;

const ADJECTIVES: &[&str] = &[
    "Walnut", "Brass", "Linen", "Ceramic", "Oak", "Copper", "Woven", "Matte", "Glazed", "Carved",
];

const NOUNS: &[&str] = &[
    "Desk Organizer",
    "Table Lamp",
    "Cushion Cover",
    "Coffee Mug",
    "Bookend",
    "Wall Clock",
    "Serving Tray",
    "Plant Stand",
    "Photo Frame",
    "Storage Basket",
];

const CATEGORIES: &[&str] = &["Home", "Office", "Kitchen", "Decor"];

/// Number of products a fresh catalog is seeded with.
pub const SEED_COUNT: usize = 24;

/// Seed the catalog when it is empty. Returns how many products were
/// created (zero when seeding was skipped).
pub async fn seed_catalog<S: ShopStore>(catalog: &CatalogService<S>) -> CatalogResult<usize> {
    if !catalog.list().await?.is_empty() {
        info!("catalog already has products, skipping seeding");
        return Ok(0);
    }

    let mut rng = rand::rng();
    for index in 0..SEED_COUNT {
        let adjective = ADJECTIVES.choose(&mut rng).unwrap_or(&ADJECTIVES[0]);
        let noun = NOUNS.choose(&mut rng).unwrap_or(&NOUNS[0]);
        let name = ProductName::try_new(format!("{adjective} {noun} No. {}", index + 1))
            .map_err(|e| ordercore::errors::CatalogError::Validation(e.to_string()))?;

        let price_units: i64 = rng.random_range(100..=1000);
        let price = Money::from_minor_units(price_units * 100)
            .map_err(|e| ordercore::errors::CatalogError::Validation(e.to_string()))?;

        let image = ImageUrl::try_new(format!(
            "https://images.ordercore.dev/products/{}.jpg",
            index + 1
        ))
        .map_err(|e| ordercore::errors::CatalogError::Validation(e.to_string()))?;

        catalog
            .create(NewProduct {
                name,
                description: Some(format!("A {} {} for everyday use.", adjective.to_lowercase(), noun.to_lowercase())),
                price,
                stock: StockQuantity::new(rng.random_range(0..=50)),
                images: vec![image],
                category: Some((*CATEGORIES.choose(&mut rng).unwrap_or(&CATEGORIES[0])).to_string()),
            })
            .await?;
    }

    info!(count = SEED_COUNT, "seeded catalog");
    Ok(SEED_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordercore_memory::InMemoryShopStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeds_an_empty_catalog_once() {
        let store = Arc::new(InMemoryShopStore::new());
        let catalog = CatalogService::new(store);

        assert_eq!(seed_catalog(&catalog).await.unwrap(), SEED_COUNT);
        assert_eq!(catalog.list().await.unwrap().len(), SEED_COUNT);

        // A second run is a no-op.
        assert_eq!(seed_catalog(&catalog).await.unwrap(), 0);
        assert_eq!(catalog.list().await.unwrap().len(), SEED_COUNT);
    }

    #[tokio::test]
    async fn seeded_prices_meet_the_order_minimum() {
        let store = Arc::new(InMemoryShopStore::new());
        let catalog = CatalogService::new(store);
        seed_catalog(&catalog).await.unwrap();

        for product in catalog.list().await.unwrap() {
            assert!(product.price.amount() >= ordercore::config::MINIMUM_ORDER_TOTAL);
        }
    }
}
