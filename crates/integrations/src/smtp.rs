use agency_core::notify::{EmailMessage, MailError, Mailer};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

/// Port that speaks TLS from the first byte instead of upgrading with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Relay connection settings.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Disable only for local capture servers.
    pub tls: bool,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("tls", &self.tls)
            .finish()
    }
}

/// Sends notification mail through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if !settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        } else if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| MailError::Transport(format!("SMTP TLS relay error: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| MailError::Transport(format!("SMTP STARTTLS relay error: {e}")))?
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        info!(host = %settings.host, port = settings.port, "SMTP mailer configured");
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        debug!(to = %message.to, subject = %message.subject, "building SMTP message");
        let email = build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!(to = %message.to, error = %e, "SMTP send failed");
            MailError::Transport(e.to_string())
        })?;

        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Build a single-part HTML message.
fn build_message(msg: &EmailMessage) -> Result<Message, MailError> {
    let from = Mailbox::new(msg.from_name.clone(), parse_address(&msg.from_address)?);
    let to = Mailbox::new(None, parse_address(&msg.to)?);

    Message::builder()
        .from(from)
        .to(to)
        .subject(&msg.subject)
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(msg.html.clone()),
        )
        .map_err(|e| MailError::Build(e.to_string()))
}
