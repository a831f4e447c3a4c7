//! Catalog store boundary.
//!
//! The catalog is one key-value table keyed by `(sku, sort key)`. This module
//! defines the capability the core needs from it (partition query, full scan,
//! batch write) and the adapters that provide it.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{BatchWriteOutput, CatalogStore, StoreError};
