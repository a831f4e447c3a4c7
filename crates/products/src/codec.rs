//! Attribute-map codec for stored catalog items.
//!
//! Items are persisted as flat attribute maps in the key-value store's native
//! shape: every attribute is either a string (`S`) or a decimal number encoded
//! as a string (`N`), serialized as `{"S": "..."}` / `{"N": "..."}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::{DomainError, Sku};

use crate::record::{ProductRecord, RecordKind};

/// Attribute names used by the catalog table.
pub mod attr {
    /// Partition key.
    pub const SKU: &str = "sku";
    /// Sort key (record kind).
    pub const SORT_KEY: &str = "sk";
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const QUANTITY: &str = "quantity";
}

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
}

impl AttributeValue {
    fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
        }
    }
}

/// A stored item: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("missing attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("attribute `{attribute}` has type {found}, expected {expected}")]
    WrongType {
        attribute: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),

    #[error("attribute `{attribute}` is not a valid number: `{value}`")]
    InvalidNumber { attribute: &'static str, value: String },

    #[error(transparent)]
    InvalidSku(#[from] DomainError),
}

/// Encode a record into its stored attribute map (sort key included).
pub fn encode(record: &ProductRecord) -> Item {
    let mut item = Item::new();
    item.insert(attr::SKU.into(), AttributeValue::S(record.sku().to_string()));
    item.insert(
        attr::SORT_KEY.into(),
        AttributeValue::S(record.kind().sort_key().into()),
    );

    match record {
        ProductRecord::Descriptor { name, price, .. } => {
            item.insert(attr::NAME.into(), AttributeValue::S(name.clone()));
            item.insert(attr::PRICE.into(), AttributeValue::N(price.to_string()));
        }
        ProductRecord::Stock { quantity, .. } => {
            item.insert(attr::QUANTITY.into(), AttributeValue::N(quantity.to_string()));
        }
    }

    item
}

/// Decode a stored attribute map back into a typed record.
///
/// Any missing or mistyped attribute is an error: a stored item that cannot be
/// decoded points at corrupted data, not at a partially known product.
pub fn decode(item: &Item) -> Result<ProductRecord, CodecError> {
    let sku = Sku::new(string_attr(item, attr::SKU)?)?;
    let sort_key = string_attr(item, attr::SORT_KEY)?;
    let kind = RecordKind::from_sort_key(sort_key)
        .ok_or_else(|| CodecError::UnknownSortKey(sort_key.to_string()))?;

    match kind {
        RecordKind::Descriptor => {
            let name = string_attr(item, attr::NAME)?.to_string();
            let price = number_attr::<f64>(item, attr::PRICE)?;
            if !price.is_finite() {
                return Err(CodecError::InvalidNumber {
                    attribute: attr::PRICE,
                    value: price.to_string(),
                });
            }
            Ok(ProductRecord::Descriptor { sku, name, price })
        }
        RecordKind::Stock => {
            let quantity = number_attr::<i64>(item, attr::QUANTITY)?;
            Ok(ProductRecord::Stock { sku, quantity })
        }
    }
}

/// Primary key `(sku, sort key)` of a stored item.
pub fn item_key(item: &Item) -> Result<(String, String), CodecError> {
    Ok((
        string_attr(item, attr::SKU)?.to_string(),
        string_attr(item, attr::SORT_KEY)?.to_string(),
    ))
}

fn string_attr<'a>(item: &'a Item, attribute: &'static str) -> Result<&'a str, CodecError> {
    match item.get(attribute) {
        Some(AttributeValue::S(value)) => Ok(value),
        Some(other) => Err(CodecError::WrongType {
            attribute,
            expected: "S",
            found: other.type_name(),
        }),
        None => Err(CodecError::MissingAttribute(attribute)),
    }
}

fn number_attr<T: core::str::FromStr>(item: &Item, attribute: &'static str) -> Result<T, CodecError> {
    match item.get(attribute) {
        Some(AttributeValue::N(value)) => value.trim().parse().map_err(|_| CodecError::InvalidNumber {
            attribute,
            value: value.clone(),
        }),
        Some(other) => Err(CodecError::WrongType {
            attribute,
            expected: "N",
            found: other.type_name(),
        }),
        None => Err(CodecError::MissingAttribute(attribute)),
    }
}
