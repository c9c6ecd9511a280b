//! Multi-step request handlers: contact submission and meeting scheduling.
//!
//! Both take an already validated command, so nothing here runs before
//! validation has passed. Steps run through a [`Saga`](crate::saga::Saga);
//! a failure stops the workflow and leaves earlier effects in place.
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::notify::{EmailMessage, MailError, Mailer, TemplateError};
use crate::store::StoreError;

pub mod contact;
pub mod meeting;

pub use contact::ContactWorkflow;
pub use meeting::MeetingWorkflow;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Send both messages concurrently and wait for both. Either failure fails
/// the pair.
async fn send_pair(
    mailer: &dyn Mailer,
    first: &EmailMessage,
    second: &EmailMessage,
) -> Result<(), MailError> {
    futures::try_join!(mailer.send(first), mailer.send(second))?;
    Ok(())
}
