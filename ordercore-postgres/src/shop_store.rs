//! `PostgreSQL` implementation of the `ShopStore` trait.
//!
//! Every guarded write runs as a conditional UPDATE carrying
//! `AND revision = $expected`. `PostgreSQL` re-evaluates the predicate
//! under the row lock, so two committers racing on the same document
//! resolve to exactly one winner; the loser's zero-row update aborts the
//! whole transaction with a revision conflict.

use async_trait::async_trait;
use ordercore::domain::{Cart, Order, Product, User};
use ordercore::errors::{StoreError, StoreResult};
use ordercore::store::{
    DocumentKey, DocumentWrite, ExpectedRevision, Revision, ShopStore, Versioned, WriteBatch,
};
use ordercore::types::{EmailAddress, OrderId, PhoneNumber, ProductId, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, instrument};

use crate::PostgresShopStore;

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateKey(
                db.constraint().unwrap_or("unique constraint").to_string(),
            );
        }
    }
    StoreError::ConnectionFailed(err.to_string())
}

fn decode_row<T: DeserializeOwned>(row: &PgRow) -> StoreResult<Versioned<T>> {
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| StoreError::Internal(e.to_string()))?;
    let revision: i64 = row
        .try_get("revision")
        .map_err(|e| StoreError::Internal(e.to_string()))?;

    let document =
        serde_json::from_value(document).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let revision = u64::try_from(revision)
        .ok()
        .and_then(|value| Revision::try_new(value).ok())
        .ok_or_else(|| StoreError::Serialization(format!("invalid revision {revision}")))?;
    Ok(Versioned::new(document, revision))
}

fn encode_document<T: Serialize>(document: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(document).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn expected_as_i64(revision: Revision) -> StoreResult<i64> {
    i64::try_from(u64::from(revision))
        .map_err(|_| StoreError::Serialization(format!("revision {revision} out of range")))
}

async fn stored_revision(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    id: uuid::Uuid,
) -> StoreResult<Option<Revision>> {
    let query = format!("SELECT revision FROM {table} WHERE id = $1");
    let row: Option<i64> = sqlx::query_scalar(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    Ok(row
        .and_then(|value| u64::try_from(value).ok())
        .and_then(|value| Revision::try_new(value).ok()))
}

/// Outcome of one guarded statement: how many rows it touched.
async fn require_one_row(
    tx: &mut Transaction<'_, Postgres>,
    rows_affected: u64,
    table: &str,
    id: uuid::Uuid,
    key: DocumentKey,
    expected: ExpectedRevision,
) -> StoreResult<()> {
    if rows_affected == 1 {
        return Ok(());
    }
    let current = stored_revision(tx, table, id).await?;
    Err(StoreError::RevisionConflict {
        key,
        expected,
        current,
    })
}

async fn apply_write(
    tx: &mut Transaction<'_, Postgres>,
    write: DocumentWrite,
) -> StoreResult<()> {
    let key = write.key();
    match write {
        DocumentWrite::PutProduct { product, expected } => {
            let id = product.id.into_uuid();
            let document = encode_document(&product)?;
            match expected {
                ExpectedRevision::New => {
                    sqlx::query(
                        "INSERT INTO products (id, document, revision, created_at) \
                         VALUES ($1, $2, 0, $3)",
                    )
                    .bind(id)
                    .bind(&document)
                    .bind(product.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                ExpectedRevision::Exact(revision) => {
                    let result = sqlx::query(
                        "UPDATE products SET document = $2, revision = revision + 1 \
                         WHERE id = $1 AND revision = $3",
                    )
                    .bind(id)
                    .bind(&document)
                    .bind(expected_as_i64(revision)?)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                    require_one_row(tx, result.rows_affected(), "products", id, key, expected)
                        .await?;
                }
                ExpectedRevision::Any => {
                    sqlx::query(
                        "INSERT INTO products (id, document, revision, created_at) \
                         VALUES ($1, $2, 0, $3) \
                         ON CONFLICT (id) DO UPDATE \
                         SET document = EXCLUDED.document, revision = products.revision + 1",
                    )
                    .bind(id)
                    .bind(&document)
                    .bind(product.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
            }
        }
        DocumentWrite::DeleteProduct { id, expected } => {
            let id = id.into_uuid();
            match expected {
                ExpectedRevision::New => {
                    return Err(StoreError::Internal(
                        "cannot delete with an insert expectation".to_string(),
                    ));
                }
                ExpectedRevision::Exact(revision) => {
                    let result =
                        sqlx::query("DELETE FROM products WHERE id = $1 AND revision = $2")
                            .bind(id)
                            .bind(expected_as_i64(revision)?)
                            .execute(&mut **tx)
                            .await
                            .map_err(map_sqlx_error)?;
                    require_one_row(tx, result.rows_affected(), "products", id, key, expected)
                        .await?;
                }
                ExpectedRevision::Any => {
                    sqlx::query("DELETE FROM products WHERE id = $1")
                        .bind(id)
                        .execute(&mut **tx)
                        .await
                        .map_err(map_sqlx_error)?;
                }
            }
        }
        DocumentWrite::PutCart { cart, expected } => {
            let id = cart.id.into_uuid();
            let document = encode_document(&cart)?;
            match expected {
                ExpectedRevision::New => {
                    sqlx::query(
                        "INSERT INTO carts (id, user_id, document, revision, created_at) \
                         VALUES ($1, $2, $3, 0, $4)",
                    )
                    .bind(id)
                    .bind(cart.user_id.into_uuid())
                    .bind(&document)
                    .bind(cart.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                ExpectedRevision::Exact(revision) => {
                    let result = sqlx::query(
                        "UPDATE carts SET document = $2, revision = revision + 1 \
                         WHERE id = $1 AND revision = $3",
                    )
                    .bind(id)
                    .bind(&document)
                    .bind(expected_as_i64(revision)?)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                    require_one_row(tx, result.rows_affected(), "carts", id, key, expected)
                        .await?;
                }
                ExpectedRevision::Any => {
                    sqlx::query(
                        "INSERT INTO carts (id, user_id, document, revision, created_at) \
                         VALUES ($1, $2, $3, 0, $4) \
                         ON CONFLICT (id) DO UPDATE \
                         SET document = EXCLUDED.document, revision = carts.revision + 1",
                    )
                    .bind(id)
                    .bind(cart.user_id.into_uuid())
                    .bind(&document)
                    .bind(cart.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
            }
        }
        DocumentWrite::PutOrder { order, expected } => {
            let id = order.id.into_uuid();
            let document = encode_document(&order)?;
            match expected {
                ExpectedRevision::New => {
                    sqlx::query(
                        "INSERT INTO orders (id, user_id, document, revision, created_at) \
                         VALUES ($1, $2, $3, 0, $4)",
                    )
                    .bind(id)
                    .bind(order.user_id.into_uuid())
                    .bind(&document)
                    .bind(order.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                ExpectedRevision::Exact(revision) => {
                    let result = sqlx::query(
                        "UPDATE orders SET document = $2, revision = revision + 1 \
                         WHERE id = $1 AND revision = $3",
                    )
                    .bind(id)
                    .bind(&document)
                    .bind(expected_as_i64(revision)?)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                    require_one_row(tx, result.rows_affected(), "orders", id, key, expected)
                        .await?;
                }
                ExpectedRevision::Any => {
                    sqlx::query(
                        "INSERT INTO orders (id, user_id, document, revision, created_at) \
                         VALUES ($1, $2, $3, 0, $4) \
                         ON CONFLICT (id) DO UPDATE \
                         SET document = EXCLUDED.document, revision = orders.revision + 1",
                    )
                    .bind(id)
                    .bind(order.user_id.into_uuid())
                    .bind(&document)
                    .bind(order.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
            }
        }
        DocumentWrite::PutUser { user, expected } => {
            let id = user.id.into_uuid();
            let document = encode_document(&user)?;
            match expected {
                ExpectedRevision::New => {
                    sqlx::query(
                        "INSERT INTO users (id, email, phone, document, revision, created_at) \
                         VALUES ($1, $2, $3, $4, 0, $5)",
                    )
                    .bind(id)
                    .bind(user.email.as_ref())
                    .bind(user.phone.as_ref())
                    .bind(&document)
                    .bind(user.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                ExpectedRevision::Exact(revision) => {
                    let result = sqlx::query(
                        "UPDATE users SET email = $2, phone = $3, document = $4, \
                         revision = revision + 1 \
                         WHERE id = $1 AND revision = $5",
                    )
                    .bind(id)
                    .bind(user.email.as_ref())
                    .bind(user.phone.as_ref())
                    .bind(&document)
                    .bind(expected_as_i64(revision)?)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                    require_one_row(tx, result.rows_affected(), "users", id, key, expected)
                        .await?;
                }
                ExpectedRevision::Any => {
                    sqlx::query(
                        "INSERT INTO users (id, email, phone, document, revision, created_at) \
                         VALUES ($1, $2, $3, $4, 0, $5) \
                         ON CONFLICT (id) DO UPDATE \
                         SET email = EXCLUDED.email, phone = EXCLUDED.phone, \
                             document = EXCLUDED.document, revision = users.revision + 1",
                    )
                    .bind(id)
                    .bind(user.email.as_ref())
                    .bind(user.phone.as_ref())
                    .bind(&document)
                    .bind(user.created_at.into_datetime())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ShopStore for PostgresShopStore {
    #[instrument(name = "postgres.get_product", skip(self))]
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Versioned<Product>>> {
        let row = sqlx::query("SELECT document, revision FROM products WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.list_products", skip(self))]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT document, revision FROM products ORDER BY created_at, id")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        rows.iter()
            .map(|row| decode_row(row).map(|versioned: Versioned<Product>| versioned.document))
            .collect()
    }

    #[instrument(name = "postgres.get_cart_by_user", skip(self))]
    async fn get_cart_by_user(&self, user_id: UserId) -> StoreResult<Option<Versioned<Cart>>> {
        let row = sqlx::query("SELECT document, revision FROM carts WHERE user_id = $1")
            .bind(user_id.into_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.get_order", skip(self))]
    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Versioned<Order>>> {
        let row = sqlx::query("SELECT document, revision FROM orders WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.list_orders_by_user", skip(self))]
    async fn list_orders_by_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT document, revision FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.into_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        rows.iter()
            .map(|row| decode_row(row).map(|versioned: Versioned<Order>| versioned.document))
            .collect()
    }

    #[instrument(name = "postgres.get_user", skip(self))]
    async fn get_user(&self, id: UserId) -> StoreResult<Option<Versioned<User>>> {
        let row = sqlx::query("SELECT document, revision FROM users WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.find_user_by_email", skip(self, email))]
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Option<Versioned<User>>> {
        let row = sqlx::query("SELECT document, revision FROM users WHERE email = $1")
            .bind(email.as_ref())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.find_user_by_phone", skip(self, phone))]
    async fn find_user_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> StoreResult<Option<Versioned<User>>> {
        let row = sqlx::query("SELECT document, revision FROM users WHERE phone = $1")
            .bind(phone.as_ref())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(name = "postgres.commit", skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        // A failed write returns early; dropping the transaction rolls
        // every prior statement back.
        for write in batch.into_writes() {
            apply_write(&mut tx, write).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!("batch committed");
        Ok(())
    }
}
