pub mod admin;
pub mod contact;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the full router with all route groups. Request bodies, uploads
/// included, are capped at `max_body_bytes`.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .merge(health::routes())
        .nest("/contact", contact::routes())
        .nest("/admin", admin::routes())
        .nest_service("/uploads", uploads)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".into())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
