use std::sync::Arc;

use thiserror::Error;

use catalog_products::{CodecError, Item};

/// Catalog store operation error.
///
/// These are **infrastructure errors** (availability, storage) as opposed to
/// domain errors (validation).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid item: {0}")]
    Codec(#[from] CodecError),

    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },
}

/// Result of one batch write call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteOutput {
    /// Items the store accepted the call for but did not write (e.g. throttling).
    pub unprocessed: Vec<Item>,
}

/// Key-value store holding catalog items.
///
/// Writes overwrite any existing item with the same `(sku, sort key)`; there is
/// no read-before-write, so concurrent writers resolve as last-write-wins.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// All items whose partition key equals `sku`.
    async fn query(&self, sku: &str) -> Result<Vec<Item>, StoreError>;

    /// Every item in the table. Order is store-defined.
    async fn scan(&self) -> Result<Vec<Item>, StoreError>;

    /// Put all items in one call. Items listed in
    /// [`BatchWriteOutput::unprocessed`] were not written.
    async fn batch_write(&self, items: Vec<Item>) -> Result<BatchWriteOutput, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn query(&self, sku: &str) -> Result<Vec<Item>, StoreError> {
        (**self).query(sku).await
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        (**self).scan().await
    }

    async fn batch_write(&self, items: Vec<Item>) -> Result<BatchWriteOutput, StoreError> {
        (**self).batch_write(items).await
    }
}
