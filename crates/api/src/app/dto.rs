use serde::Serialize;

use catalog_products::Product;

/// Body of `GET /products`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}
