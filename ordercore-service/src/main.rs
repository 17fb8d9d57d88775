//! Service entry point.
//!
//! Backend selection is environment-driven: with `DATABASE_URL` set the
//! service runs against postgres (migrating on boot); without it, an
//! in-memory store is seeded with a demo catalog and admin account.

use std::sync::Arc;

use anyhow::Context;
use ordercore::accounts::derive_credential;
use ordercore::domain::{Role, User};
use ordercore::store::{ExpectedRevision, ShopStore, WriteBatch};
use ordercore::types::{EmailAddress, Password, PersonName, PhoneNumber};
use ordercore_memory::InMemoryShopStore;
use ordercore_postgres::PostgresShopStore;
use ordercore_service::{create_app, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let app = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            info!("using postgres store");
            let store = PostgresShopStore::new(url)
                .await
                .context("connecting to postgres")?;
            store.migrate().await.context("running migrations")?;
            create_app(AppState::new(Arc::new(store)))
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory store with demo data");
            let store = Arc::new(InMemoryShopStore::new());
            let state = AppState::new(store.clone());
            ordercore_service::seed::seed_catalog(&state.catalog)
                .await
                .context("seeding catalog")?;
            bootstrap_admin(&store).await.context("creating admin")?;
            create_app(state)
        }
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(%bind_addr, "listening");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

/// Create the development admin account on an empty in-memory store.
///
/// Credentials come from `ADMIN_EMAIL` / `ADMIN_PASSWORD`, with demo
/// defaults. Useful only for the in-memory backend, which starts empty on
/// every boot.
async fn bootstrap_admin(store: &Arc<InMemoryShopStore>) -> anyhow::Result<()> {
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@ordercore.dev".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme-admin".to_string());

    let email = EmailAddress::try_new(email).map_err(|e| anyhow::anyhow!("{e}"))?;
    let password = Password::try_new(password).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut admin = User::new(
        PersonName::try_new("Administrator").map_err(|e| anyhow::anyhow!("{e}"))?,
        email.clone(),
        PhoneNumber::try_new("+910000000000").map_err(|e| anyhow::anyhow!("{e}"))?,
        derive_credential(&password),
        Vec::new(),
    );
    admin.role = Role::Admin;

    store
        .commit(WriteBatch::new().put_user(admin, ExpectedRevision::New))
        .await?;

    info!(%email, "admin account ready");
    Ok(())
}
