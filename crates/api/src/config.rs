use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Shared admin passphrase exchanged for a session token.
    pub admin_password: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Relay account; also the sender address on every message.
    pub email_user: String,
    pub email_pass: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: bool,
    /// Operator inbox.
    pub admin_email: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_refresh_token: String,
    /// Zone meeting wall-clock times are read in.
    pub scheduler_timezone: Tz,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("admin_password", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("email_user", &self.email_user)
            .field("email_pass", &"[REDACTED]")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_tls", &self.smtp_tls)
            .field("admin_email", &self.admin_email)
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"[REDACTED]")
            .field("google_redirect_uri", &self.google_redirect_uri)
            .field("google_refresh_token", &"[REDACTED]")
            .field("scheduler_timezone", &self.scheduler_timezone)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, applying defaults for optional
    /// settings.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        Ok(Self {
            host: vars.or("HOST", "0.0.0.0"),
            port: vars.parsed("PORT", 3000)?,
            database_url: vars.required("DATABASE_URL")?,
            db_max_connections: vars.parsed("DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: vars.parsed("DB_MIN_CONNECTIONS", 1)?,
            admin_password: vars.required("ADMIN_PASSWORD")?,
            jwt_secret: vars.or("JWT_SECRET", "dev-secret-change-me-in-production"),
            email_user: vars.or("EMAIL_USER", ""),
            email_pass: vars.or("EMAIL_PASS", ""),
            smtp_host: vars.or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: vars.parsed("SMTP_PORT", 587)?,
            smtp_tls: vars.parsed("SMTP_TLS", true)?,
            admin_email: vars.required("ADMIN_EMAIL")?,
            google_client_id: vars.or("GOOGLE_CLIENT_ID", ""),
            google_client_secret: vars.or("GOOGLE_CLIENT_SECRET", ""),
            google_redirect_uri: vars.or("GOOGLE_REDIRECT_URI", ""),
            google_refresh_token: vars.or("GOOGLE_REFRESH_TOKEN", ""),
            scheduler_timezone: vars.parsed("SCHEDULER_TIMEZONE", Tz::UTC)?,
            upload_dir: PathBuf::from(vars.or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: vars.parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            log_level: vars.or("LOG_LEVEL", "info"),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                value: raw,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/agency"),
        ("ADMIN_PASSWORD", "letmein"),
        ("ADMIN_EMAIL", "owner@agency.test"),
    ];

    #[test]
    fn applies_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert!(config.smtp_tls);
        assert_eq!(config.scheduler_timezone, Tz::UTC);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.db_min_connections, 1);
    }

    #[test]
    fn missing_required_value_is_reported() {
        let err = load(&REQUIRED[..2]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADMIN_EMAIL")));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = load(&pairs).unwrap_err();
        assert_eq!(err.to_string(), "PORT has invalid value `eighty`");
    }

    #[test]
    fn reads_timezone_by_name() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SCHEDULER_TIMEZONE", "Europe/London"));
        let config = load(&pairs).unwrap();
        assert_eq!(config.scheduler_timezone, chrono_tz::Europe::London);
    }

    #[test]
    fn debug_hides_secrets() {
        let shown = format!("{:?}", load(&REQUIRED).unwrap());
        assert!(!shown.contains("letmein"));
        assert!(!shown.contains("postgres://"));
    }
}
