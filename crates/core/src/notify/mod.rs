//! Outbound email: the transport seam and the HTML templates.
use async_trait::async_trait;
use thiserror::Error;

pub mod templates;

pub use templates::{EmailTemplate, TemplateError, TemplateRenderer};

/// A rendered HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Display name shown next to the sender address, if any.
    pub from_name: Option<String>,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("failed to send email: {0}")]
    Transport(String),
}

/// Delivers rendered messages through the mail relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Addresses used on notification mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Relay account that every message is sent from.
    pub sender_address: String,
    /// Operator inbox that receives admin notifications and meeting invites.
    pub operator_address: String,
}
