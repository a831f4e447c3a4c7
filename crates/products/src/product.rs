use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use catalog_core::Sku;

use crate::record::ProductRecord;

/// API-facing product: the union of every record stored under one sku.
///
/// Fields are only present when a record of the kind that carries them exists;
/// a product with just a stock record has no `name`/`price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: Sku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl Product {
    /// Both a descriptor and a stock record contributed to this product.
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.price.is_some() && self.quantity.is_some()
    }
}

/// Accumulates the records of a single sku into a [`Product`].
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    sku: Sku,
    name: Option<String>,
    price: Option<f64>,
    quantity: Option<i64>,
}

impl ProductBuilder {
    pub fn new(sku: Sku) -> Self {
        Self {
            sku,
            name: None,
            price: None,
            quantity: None,
        }
    }

    /// Union the record's fields into the builder.
    ///
    /// Fields carried by the record overwrite earlier values; fields it does not
    /// carry are left untouched. The record must belong to the builder's sku.
    pub fn absorb(&mut self, record: ProductRecord) {
        debug_assert_eq!(record.sku(), &self.sku, "record merged into foreign sku");

        match record {
            ProductRecord::Descriptor { name, price, .. } => {
                self.name = Some(name);
                self.price = Some(price);
            }
            ProductRecord::Stock { quantity, .. } => {
                self.quantity = Some(quantity);
            }
        }
    }

    pub fn build(self) -> Product {
        Product {
            sku: self.sku,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Fold records into one product per sku, ordered by sku.
pub fn merge_records(records: impl IntoIterator<Item = ProductRecord>) -> Vec<Product> {
    let mut by_sku: BTreeMap<Sku, ProductBuilder> = BTreeMap::new();

    for record in records {
        by_sku
            .entry(record.sku().clone())
            .or_insert_with_key(|sku| ProductBuilder::new(sku.clone()))
            .absorb(record);
    }

    by_sku.into_values().map(ProductBuilder::build).collect()
}
