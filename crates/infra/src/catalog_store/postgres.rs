//! Postgres-backed catalog table.
//!
//! Items are stored as JSONB attribute maps next to their extracted primary key:
//!
//! ```sql
//! CREATE TABLE <table> (
//!     sku        TEXT  NOT NULL,
//!     sk         TEXT  NOT NULL,
//!     attributes JSONB NOT NULL,
//!     PRIMARY KEY (sku, sk)
//! );
//! ```
//!
//! A batch write runs as one transaction of upserts applied in input order, so a
//! key repeated within a batch resolves to its last occurrence.

use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use catalog_products::Item;
use catalog_products::codec::item_key;

use super::r#trait::{BatchWriteOutput, CatalogStore, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
    table: String,
}

impl PostgresCatalogStore {
    /// `table` must be a plain SQL identifier; config loading validates it.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Create the catalog table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                sku TEXT NOT NULL, \
                sk TEXT NOT NULL, \
                attributes JSONB NOT NULL, \
                PRIMARY KEY (sku, sk))",
            self.table
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    fn rows_to_items(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Item>, StoreError> {
        rows.into_iter()
            .map(|row| {
                row.try_get::<Json<Item>, _>("attributes")
                    .map(|json| json.0)
                    .map_err(|e| map_sqlx_error("decode_attributes", e))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(table = %self.table), err)]
    async fn query(&self, sku: &str) -> Result<Vec<Item>, StoreError> {
        let sql = format!("SELECT attributes FROM {} WHERE sku = $1 ORDER BY sk", self.table);
        let rows = sqlx::query(&sql)
            .bind(sku)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("query", e))?;

        Self::rows_to_items(rows)
    }

    #[instrument(skip(self), fields(table = %self.table), err)]
    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        let sql = format!("SELECT attributes FROM {} ORDER BY sku, sk", self.table);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("scan", e))?;

        Self::rows_to_items(rows)
    }

    #[instrument(skip(self, items), fields(table = %self.table, item_count = items.len()), err)]
    async fn batch_write(&self, items: Vec<Item>) -> Result<BatchWriteOutput, StoreError> {
        let keys = items.iter().map(item_key).collect::<Result<Vec<_>, _>>()?;

        let sql = format!(
            "INSERT INTO {} (sku, sk, attributes) VALUES ($1, $2, $3) \
             ON CONFLICT (sku, sk) DO UPDATE SET attributes = EXCLUDED.attributes",
            self.table
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        for ((sku, sk), item) in keys.iter().zip(&items) {
            sqlx::query(&sql)
                .bind(sku)
                .bind(sk)
                .bind(Json(item))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("batch_write", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(BatchWriteOutput::default())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation,
            message: db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
