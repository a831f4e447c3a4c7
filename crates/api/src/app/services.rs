//! Service wiring: one reader and one importer sharing a catalog store.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use catalog_infra::catalog_store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore};
use catalog_infra::config::Config;
use catalog_infra::ingestion::Importer;
use catalog_infra::object_source::{ObjectSource, S3ObjectSource};
use catalog_infra::reader::ProductReader;

const MAX_DB_CONNECTIONS: u32 = 5;

pub struct AppServices {
    pub reader: ProductReader,
    pub importer: Importer,
}

impl AppServices {
    pub fn new(
        source: Arc<dyn ObjectSource>,
        store: Arc<dyn CatalogStore>,
        batch_write_max: usize,
    ) -> Self {
        Self {
            reader: ProductReader::new(store.clone()),
            importer: Importer::new(source, store, batch_write_max),
        }
    }
}

/// Build the production services described by `config`.
///
/// With `DATABASE_URL` set the catalog lives in Postgres (table created on
/// start); otherwise an in-memory store is used and its contents are lost on exit.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await?;
            let store = PostgresCatalogStore::new(pool, config.table_name.clone());
            store.ensure_schema().await?;
            tracing::info!(table = %config.table_name, "using postgres catalog store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory catalog store");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    let source = Arc::new(S3ObjectSource::new(config.region.clone()));

    Ok(AppServices::new(source, store, config.batch_write_max))
}
