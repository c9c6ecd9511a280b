use super::{is_email, non_blank, FieldError};
use crate::model::{ContactRequest, NewContactMessage};

/// Check a contact submission field by field, stopping at the first failure.
pub fn validate_contact(request: &ContactRequest) -> Result<NewContactMessage, FieldError> {
    let name = non_blank(request.name.as_deref())
        .ok_or_else(|| FieldError::body("name", "Name is required"))?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| is_email(e))
        .ok_or_else(|| FieldError::body("email", "Valid email is required"))?;

    let message = non_blank(request.message.as_deref())
        .ok_or_else(|| FieldError::body("message", "Message is required"))?;

    Ok(NewContactMessage {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}
