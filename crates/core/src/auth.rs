//! Admin session gate.
//!
//! A single shared passphrase buys a signed HS256 token with `role = "admin"`
//! that stays valid for two hours. There is no refresh and no revocation;
//! clients log in again once the token expires.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const ADMIN_ROLE: &str = "admin";

/// Lifetime of an admin token.
pub const SESSION_TTL: Duration = Duration::hours(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password is required")]
    MissingPassword,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authorization token required")]
    MissingToken,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Admin role required")]
    NotAdmin,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and checks admin tokens.
#[derive(Clone)]
pub struct AdminGate {
    passphrase: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("passphrase", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AdminGate {
    pub fn new(passphrase: impl Into<String>, signing_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `authorize_at` with zero leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            passphrase: passphrase.into(),
            encoding: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding: DecodingKey::from_secret(signing_secret.as_bytes()),
            validation,
        }
    }

    /// Exchange the admin passphrase for a token.
    pub fn verify(&self, password: Option<&str>) -> Result<String, AuthError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::MissingPassword)?;

        let matches: bool = password
            .as_bytes()
            .ct_eq(self.passphrase.as_bytes())
            .into();
        if !matches || self.passphrase.is_empty() {
            tracing::warn!("admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_at(Utc::now())?;
        tracing::info!("admin token issued");
        Ok(token)
    }

    /// Sign a token as if issued at `issued_at`.
    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AdminClaims {
            role: ADMIN_ROLE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + SESSION_TTL).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check a bearer token against the current time.
    pub fn authorize(&self, token: &str) -> Result<AdminClaims, AuthError> {
        self.authorize_at(token, Utc::now())
    }

    /// Check a bearer token. A token is expired from the second named by
    /// `exp` onwards.
    pub fn authorize_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminClaims, AuthError> {
        let data = decode::<AdminClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "admin token rejected");
            AuthError::InvalidToken
        })?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        if claims.role != ADMIN_ROLE {
            return Err(AuthError::NotAdmin);
        }
        Ok(claims)
    }
}
