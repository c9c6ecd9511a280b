//! HTTP surface of the agency site: configuration, state, error mapping,
//! admin session extraction, image uploads and routes.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod uploads;

use axum::Router;

pub use config::AppConfig;
pub use state::{AppState, Collaborators};

/// The complete application with CORS and request tracing applied.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    routes::build_router(state, max_body_bytes)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer())
}
