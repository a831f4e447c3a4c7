//! Products domain module (catalog data model).
//!
//! This crate contains the stored record model, its attribute codec, the
//! merge projection into API-facing products, and CSV import parsing. Everything
//! here is deterministic (no IO, no HTTP, no storage).

pub mod codec;
pub mod import;
pub mod product;
pub mod record;

pub use codec::{AttributeValue, CodecError, Item};
pub use import::{
    ImportCategory, ImportRow, ObjectKey, ParsedRows, ProductRow, RowError, StockRow, parse_rows,
};
pub use product::{Product, ProductBuilder, merge_records};
pub use record::{ProductRecord, RecordKind};
