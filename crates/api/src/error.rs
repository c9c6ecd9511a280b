use agency_core::auth::AuthError;
use agency_core::saga::SagaError;
use agency_core::store::StoreError;
use agency_core::validate::{BlogValidationError, FieldError};
use agency_core::workflow::WorkflowError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error type. Every body carries `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// First invalid field, reported in an `errors` list.
    #[error("validation failed: {0}")]
    Validation(FieldError),

    /// First invalid field, reported as a single `error` object.
    #[error("validation failed: {0}")]
    InvalidField(FieldError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Workflow(#[from] SagaError<WorkflowError>),

    /// The meeting listing reports store failures with its own shape.
    #[error("failed to fetch meetings: {0}")]
    MeetingsUnavailable(StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "errors": [field] }),
            ),
            ApiError::InvalidField(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": field }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, message_body(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, message_body(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, message_body(msg)),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                message_body("Method not allowed"),
            ),
            ApiError::Workflow(err) => {
                tracing::error!(
                    saga = err.saga,
                    step = err.step,
                    left_behind = ?err.left_behind,
                    error = %err.source,
                    "workflow failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "errors": [{ "param": "general", "msg": err.source.to_string() }],
                    }),
                )
            }
            ApiError::MeetingsUnavailable(err) => {
                tracing::error!("Meeting listing failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "message": "Failed to fetch meetings",
                        "error": err.to_string(),
                    }),
                )
            }
            ApiError::Store(err) => {
                tracing::error!("Store error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, message_body(&err.to_string()))
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message_body("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn message_body(message: &str) -> serde_json::Value {
    json!({ "success": false, "message": message })
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPassword => ApiError::BadRequest(err.to_string()),
            AuthError::Signing(e) => ApiError::Internal(format!("token signing failed: {e}")),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<BlogValidationError> for ApiError {
    fn from(err: BlogValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_the_field() {
        let (status, body) =
            render(ApiError::Validation(FieldError::body("name", "Name is required"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0]["param"], "name");
        assert_eq!(body["errors"][0]["location"], "body");
    }

    #[tokio::test]
    async fn auth_errors_map_to_status() {
        let (status, body) = render(AuthError::MissingPassword.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Password is required");

        let (status, _) = render(AuthError::Expired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = render(ApiError::Internal("secret path".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
    }
}
