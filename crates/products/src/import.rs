//! CSV import: object keys, import categories, row parsing and tagging.
//!
//! Parsing and tagging are separate steps: [`parse_rows`] produces untagged
//! rows, and [`ImportRow::into_record`] turns each one into a stored record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::Sku;

use crate::record::{ProductRecord, RecordKind};

/// Logical category of an uploaded file, taken from the first key segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportCategory {
    Products,
    Stock,
    Unknown(String),
}

impl ImportCategory {
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "products" => ImportCategory::Products,
            "stock" => ImportCategory::Stock,
            other => ImportCategory::Unknown(other.to_string()),
        }
    }

    /// Record kind produced by files of this category.
    pub fn record_kind(&self) -> Option<RecordKind> {
        match self {
            ImportCategory::Products => Some(RecordKind::Descriptor),
            ImportCategory::Stock => Some(RecordKind::Stock),
            ImportCategory::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImportCategory::Products => "products",
            ImportCategory::Stock => "stock",
            ImportCategory::Unknown(other) => other,
        }
    }
}

/// An object key of the form `<category>/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub category: ImportCategory,
    pub filename: String,
}

impl ObjectKey {
    /// Returns `None` unless the key has exactly two `/`-separated segments and
    /// a non-empty filename.
    pub fn parse(key: &str) -> Option<Self> {
        let mut segments = key.split('/');
        let category = segments.next()?;
        let filename = segments.next()?;
        if segments.next().is_some() || filename.is_empty() {
            return None;
        }

        Some(ObjectKey {
            category: ImportCategory::from_segment(category),
            filename: filename.to_string(),
        })
    }
}

/// Untagged row of a `products` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub sku: Sku,
    pub name: String,
    pub price: f64,
}

/// Untagged row of a `stock` file.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub sku: Sku,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportRow {
    Product(ProductRow),
    Stock(StockRow),
}

impl ImportRow {
    /// Tag the row with its record kind.
    pub fn into_record(self) -> ProductRecord {
        match self {
            ImportRow::Product(row) => ProductRecord::Descriptor {
                sku: row.sku,
                name: row.name,
                price: row.price,
            },
            ImportRow::Stock(row) => ProductRecord::Stock {
                sku: row.sku,
                quantity: row.quantity,
            },
        }
    }
}

/// A row that could not be coerced into its typed shape.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("row {row}: {message}")]
pub struct RowError {
    /// 1-based position among the file's data rows (header excluded).
    pub row: usize,
    pub message: String,
}

/// Outcome of parsing one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    pub rows: Vec<ImportRow>,
    pub rejected: Vec<RowError>,
}

impl ParsedRows {
    pub fn into_records(self) -> Vec<ProductRecord> {
        self.rows.into_iter().map(ImportRow::into_record).collect()
    }
}

#[derive(Deserialize)]
struct RawProductRow {
    sku: String,
    name: String,
    price: f64,
}

#[derive(Deserialize)]
struct RawStockRow {
    sku: String,
    quantity: i64,
}

/// Parse comma-separated text with a header row into rows of `kind`'s shape.
///
/// Columns are matched by header name; extra columns are ignored and blank
/// lines skipped. Rows that fail coercion are reported in
/// [`ParsedRows::rejected`] and do not stop the rest of the file.
pub fn parse_rows(kind: RecordKind, text: &str) -> ParsedRows {
    match kind {
        RecordKind::Descriptor => parse_with(text, |raw: RawProductRow| {
            if !raw.price.is_finite() {
                return Err(format!("price `{}` is not a finite number", raw.price));
            }
            Ok(ImportRow::Product(ProductRow {
                sku: parse_sku(raw.sku)?,
                name: raw.name,
                price: raw.price,
            }))
        }),
        RecordKind::Stock => parse_with(text, |raw: RawStockRow| {
            Ok(ImportRow::Stock(StockRow {
                sku: parse_sku(raw.sku)?,
                quantity: raw.quantity,
            }))
        }),
    }
}

fn parse_sku(raw: String) -> Result<Sku, String> {
    Sku::new(raw).map_err(|e| e.to_string())
}

fn parse_with<R, F>(text: &str, convert: F) -> ParsedRows
where
    R: for<'de> Deserialize<'de>,
    F: Fn(R) -> Result<ImportRow, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedRows::default();
    for (index, result) in reader.deserialize::<R>().enumerate() {
        let row = index + 1;
        match result.map_err(|e| e.to_string()).and_then(&convert) {
            Ok(import_row) => parsed.rows.push(import_row),
            Err(message) => parsed.rejected.push(RowError { row, message }),
        }
    }

    parsed
}
