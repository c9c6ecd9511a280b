//! Request validation.
//!
//! Contact and meeting requests stop at the first failing field and report it
//! as a [`FieldError`]; blog posts report a [`BlogValidationError`].
use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail;

pub mod blog;
pub mod contact;
pub mod meeting;

pub use blog::{validate_blog, BlogValidationError};
pub use contact::validate_contact;
pub use meeting::validate_meeting;

/// Where a failing value was read from. Only JSON bodies are validated.
pub const BODY: &str = "body";

/// The first invalid field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{param}: {msg}")]
pub struct FieldError {
    pub param: &'static str,
    pub msg: &'static str,
    pub location: &'static str,
}

impl FieldError {
    pub fn body(param: &'static str, msg: &'static str) -> Self {
        Self {
            param,
            msg,
            location: BODY,
        }
    }
}

/// Trimmed, non-empty text, or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whether `value` is a syntactically valid email address.
pub fn is_email(value: &str) -> bool {
    value.validate_email()
}

/// Canonical form used for stored attendee addresses.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
