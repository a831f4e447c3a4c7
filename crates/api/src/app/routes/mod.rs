use axum::Router;

pub mod notifications;
pub mod products;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .merge(products::router())
        .nest("/notifications", notifications::router())
}
