use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use catalog_infra::ingestion::ObjectCreatedNotification;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/object-created", post(object_created))
}

/// Import every object referenced by an object-created notification.
///
/// Per-file failures are reported in the body; the status is 200 whenever the
/// notification itself could be parsed.
pub async fn object_created(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ObjectCreatedNotification>, JsonRejection>,
) -> axum::response::Response {
    let Json(notification) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_notification", rejection.body_text());
        }
    };

    let report = services.importer.handle(&notification).await;
    (StatusCode::OK, Json(report)).into_response()
}
