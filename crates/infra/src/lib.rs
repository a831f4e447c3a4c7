//! Infrastructure layer: catalog store, object storage, ingestion, reads, config.

pub mod catalog_store;
pub mod config;
pub mod ingestion;
pub mod object_source;
pub mod reader;
