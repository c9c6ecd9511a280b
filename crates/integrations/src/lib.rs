//! Outbound adapters: SMTP delivery and Google Calendar booking.

pub mod google;
pub mod smtp;

pub use google::{GoogleCalendarClient, GoogleCredentials};
pub use smtp::{SmtpMailer, SmtpSettings};
