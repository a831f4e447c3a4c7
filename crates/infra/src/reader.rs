//! Merge-projection reads over the catalog store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use catalog_core::Sku;
use catalog_products::codec;
use catalog_products::{CodecError, Item, Product, ProductRecord, merge_records};

use crate::catalog_store::{CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored item could not be decoded: {0}")]
    Decode(#[from] CodecError),
}

/// Reads stored records and folds them into products.
#[derive(Clone)]
pub struct ProductReader {
    store: Arc<dyn CatalogStore>,
}

impl ProductReader {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Every product in the catalog (full scan), ordered by sku.
    #[instrument(skip(self), err)]
    pub async fn list_products(&self) -> Result<Vec<Product>, ReadError> {
        let items = self.store.scan().await?;
        let products = merge_records(decode_all(&items)?);
        debug!(items = items.len(), products = products.len(), "scanned catalog");
        Ok(products)
    }

    /// The product stored under `sku`, or `None` when no record exists for it.
    ///
    /// One record of either kind is enough for the product to be found.
    #[instrument(skip_all, fields(sku = %sku), err)]
    pub async fn get_product(&self, sku: &Sku) -> Result<Option<Product>, ReadError> {
        let items = self.store.query(sku.as_str()).await?;
        let product = merge_records(decode_all(&items)?)
            .into_iter()
            .find(|product| &product.sku == sku);
        Ok(product)
    }
}

fn decode_all(items: &[Item]) -> Result<Vec<ProductRecord>, CodecError> {
    items.iter().map(codec::decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::AttributeValue;
    use catalog_products::codec::{attr, encode};

    use crate::catalog_store::{BatchWriteOutput, InMemoryCatalogStore};

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    async fn seeded(records: Vec<ProductRecord>) -> Arc<InMemoryCatalogStore> {
        let store = Arc::new(InMemoryCatalogStore::new());
        store
            .batch_write(records.iter().map(encode).collect())
            .await
            .unwrap();
        store
    }

    struct DownStore;

    #[async_trait::async_trait]
    impl CatalogStore for DownStore {
        async fn query(&self, _sku: &str) -> Result<Vec<Item>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn scan(&self) -> Result<Vec<Item>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn batch_write(&self, _items: Vec<Item>) -> Result<BatchWriteOutput, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn get_merges_both_kinds() {
        let store = seeded(vec![
            ProductRecord::descriptor(sku("A1"), "Widget", 9.99),
            ProductRecord::stock(sku("A1"), 42),
            ProductRecord::stock(sku("A2"), 1),
        ])
        .await;
        let reader = ProductReader::new(store);

        let product = reader.get_product(&sku("A1")).await.unwrap().unwrap();
        assert_eq!(
            product,
            Product {
                sku: sku("A1"),
                name: Some("Widget".into()),
                price: Some(9.99),
                quantity: Some(42),
            }
        );
    }

    #[tokio::test]
    async fn stock_only_sku_is_found() {
        let reader = ProductReader::new(seeded(vec![ProductRecord::stock(sku("B1"), 0)]).await);

        let product = reader.get_product(&sku("B1")).await.unwrap().unwrap();
        assert_eq!(product.quantity, Some(0));
        assert_eq!(product.name, None);
    }

    #[tokio::test]
    async fn unknown_sku_is_none() {
        let reader = ProductReader::new(seeded(vec![ProductRecord::stock(sku("B1"), 0)]).await);
        assert_eq!(reader.get_product(&sku("Z9")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_groups_by_sku() {
        let reader = ProductReader::new(
            seeded(vec![
                ProductRecord::stock(sku("B1"), 5),
                ProductRecord::descriptor(sku("A1"), "Widget", 9.99),
                ProductRecord::stock(sku("A1"), 42),
            ])
            .await,
        );

        let products = reader.list_products().await.unwrap();
        let skus: Vec<&str> = products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["A1", "B1"]);
        assert!(products[0].is_complete());
    }

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let reader = ProductReader::new(Arc::new(InMemoryCatalogStore::new()));
        assert!(reader.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let reader = ProductReader::new(Arc::new(DownStore));

        assert!(matches!(reader.list_products().await, Err(ReadError::Store(_))));
        assert!(matches!(reader.get_product(&sku("A1")).await, Err(ReadError::Store(_))));
    }

    #[tokio::test]
    async fn corrupt_item_fails_loudly() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let mut item = encode(&ProductRecord::descriptor(sku("A1"), "Widget", 9.99));
        item.insert(attr::PRICE.into(), AttributeValue::S("cheap".into()));
        store.batch_write(vec![item]).await.unwrap();
        let reader = ProductReader::new(store);

        assert!(matches!(
            reader.get_product(&sku("A1")).await,
            Err(ReadError::Decode(CodecError::WrongType { attribute: "price", .. }))
        ));
    }
}
