use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_infra::reader::ReadError;

pub fn read_error_to_response(err: ReadError) -> axum::response::Response {
    match err {
        ReadError::Store(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
        ReadError::Decode(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `404 {}`: the not-found body carries no fields.
pub fn not_found() -> axum::response::Response {
    (StatusCode::NOT_FOUND, axum::Json(json!({}))).into_response()
}
