use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use catalog_core::Sku;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

/// Collection reads answer on `/products` and `/products/`.
pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/", get(list_products))
        .route("/products/:sku", get(get_product))
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reader.list_products().await {
        Ok(products) => (StatusCode::OK, Json(dto::ProductListResponse { products })).into_response(),
        Err(e) => errors::read_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sku): Path<String>,
) -> axum::response::Response {
    // A blank sku cannot have been stored.
    let Ok(sku) = Sku::new(sku) else {
        return errors::not_found();
    };

    match services.reader.get_product(&sku).await {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::read_error_to_response(e),
    }
}
