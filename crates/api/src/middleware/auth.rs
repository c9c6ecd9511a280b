use agency_core::auth::{AdminClaims, AuthError};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::error::ApiError;
use crate::state::AppState;

/// A request carrying a valid, unexpired admin token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: AdminClaims,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingToken)?;

        let claims = state.gate().authorize(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "admin request rejected");
            e
        })?;

        Ok(AdminSession { claims })
    }
}
