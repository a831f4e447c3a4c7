use std::collections::BTreeMap;
use std::sync::RwLock;

use catalog_products::Item;
use catalog_products::codec::item_key;

use super::r#trait::{BatchWriteOutput, CatalogStore, StoreError};

type ItemKey = (String, String);

/// In-memory catalog table.
///
/// Intended for tests/dev. An optional per-call write capacity makes batch
/// writes report overflow as unprocessed, the way a throttled store does.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: RwLock<BTreeMap<ItemKey, Item>>,
    write_capacity: Option<usize>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `capacity` items per batch write; the rest come back unprocessed.
    pub fn with_write_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            write_capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored item, ordered by key.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory catalog lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn query(&self, sku: &str) -> Result<Vec<Item>, StoreError> {
        let map = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(map
            .iter()
            .filter(|((partition, _), _)| partition == sku)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        let map = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn batch_write(&self, mut items: Vec<Item>) -> Result<BatchWriteOutput, StoreError> {
        // Reject the whole call on a keyless item, before anything is written.
        let keys = items.iter().map(item_key).collect::<Result<Vec<_>, _>>()?;

        let accepted = self.write_capacity.unwrap_or(items.len()).min(items.len());
        let unprocessed = items.split_off(accepted);

        let mut map = self.items.write().map_err(|_| Self::poisoned())?;
        for (key, item) in keys.into_iter().zip(items) {
            map.insert(key, item);
        }

        Ok(BatchWriteOutput { unprocessed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::Sku;
    use catalog_products::ProductRecord;
    use catalog_products::codec::encode;

    fn descriptor(sku: &str, name: &str) -> Item {
        encode(&ProductRecord::descriptor(Sku::new(sku).unwrap(), name, 1.5))
    }

    fn stock(sku: &str, quantity: i64) -> Item {
        encode(&ProductRecord::stock(Sku::new(sku).unwrap(), quantity))
    }

    #[tokio::test]
    async fn query_returns_only_the_partition() {
        let store = InMemoryCatalogStore::new();
        store
            .batch_write(vec![descriptor("A1", "Widget"), stock("A1", 4), stock("A10", 1)])
            .await
            .unwrap();

        assert_eq!(store.query("A1").await.unwrap().len(), 2);
        assert_eq!(store.query("A10").await.unwrap().len(), 1);
        assert!(store.query("Z9").await.unwrap().is_empty());
        assert_eq!(store.scan().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn same_key_is_overwritten() {
        let store = InMemoryCatalogStore::new();
        store
            .batch_write(vec![descriptor("A1", "Old"), descriptor("A1", "New")])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(), vec![descriptor("A1", "New")]);
    }

    #[tokio::test]
    async fn write_capacity_reports_overflow_as_unprocessed() {
        let store = InMemoryCatalogStore::with_write_capacity(2);
        let output = store
            .batch_write(vec![stock("A1", 1), stock("A2", 2), stock("A3", 3)])
            .await
            .unwrap();

        assert_eq!(output.unprocessed, vec![stock("A3", 3)]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn keyless_item_rejects_whole_batch() {
        let store = InMemoryCatalogStore::new();
        let result = store.batch_write(vec![stock("A1", 1), Item::new()]).await;

        assert!(matches!(result, Err(StoreError::Codec(_))));
        assert!(store.is_empty());
    }
}
