pub mod auth;
pub mod cors;
pub mod request_tracing;

pub use auth::AdminSession;
