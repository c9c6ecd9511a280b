use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The public site and the admin panel are served from other origins and
/// authenticate with a bearer header, never cookies.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
