use serde::{Deserialize, Serialize};

use catalog_core::Sku;

/// Sort-key differentiator for records sharing one sku partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Descriptive attributes: name and price.
    Descriptor,
    /// Stock-quantity attributes.
    Stock,
}

impl RecordKind {
    /// Sort-key value persisted for this kind.
    pub fn sort_key(&self) -> &'static str {
        match self {
            RecordKind::Descriptor => "data",
            RecordKind::Stock => "stock",
        }
    }

    pub fn from_sort_key(value: &str) -> Option<Self> {
        match value {
            "data" => Some(RecordKind::Descriptor),
            "stock" => Some(RecordKind::Stock),
            _ => None,
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.sort_key())
    }
}

/// A stored catalog record, keyed by `(sku, kind)`.
///
/// Both kinds live in the same sku partition so one partition query returns
/// every fact known about a product.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductRecord {
    Descriptor { sku: Sku, name: String, price: f64 },
    Stock { sku: Sku, quantity: i64 },
}

impl ProductRecord {
    pub fn descriptor(sku: Sku, name: impl Into<String>, price: f64) -> Self {
        ProductRecord::Descriptor {
            sku,
            name: name.into(),
            price,
        }
    }

    pub fn stock(sku: Sku, quantity: i64) -> Self {
        ProductRecord::Stock { sku, quantity }
    }

    pub fn sku(&self) -> &Sku {
        match self {
            ProductRecord::Descriptor { sku, .. } | ProductRecord::Stock { sku, .. } => sku,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            ProductRecord::Descriptor { .. } => RecordKind::Descriptor,
            ProductRecord::Stock { .. } => RecordKind::Stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_round_trip() {
        for kind in [RecordKind::Descriptor, RecordKind::Stock] {
            assert_eq!(RecordKind::from_sort_key(kind.sort_key()), Some(kind));
        }
        assert_eq!(RecordKind::from_sort_key("DATA"), None);
        assert_eq!(RecordKind::from_sort_key(""), None);
    }

    #[test]
    fn kind_follows_variant() {
        let sku = Sku::new("A1").unwrap();
        assert_eq!(
            ProductRecord::descriptor(sku.clone(), "Widget", 9.99).kind(),
            RecordKind::Descriptor
        );
        assert_eq!(ProductRecord::stock(sku.clone(), 3).kind(), RecordKind::Stock);
        assert_eq!(ProductRecord::stock(sku.clone(), 3).sku(), &sku);
    }
}
