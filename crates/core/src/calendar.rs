//! Calendar collaborator seam.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Default,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub email: String,
    /// Mark the invitation as already accepted.
    pub accepted: bool,
}

/// Event to book. Times are UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
    pub guests_can_modify: bool,
    pub guests_can_invite_others: bool,
    pub visibility: Visibility,
    /// Ask the provider to attach a generated video-conference link. The id
    /// must be unique per request.
    pub conference_request_id: Option<String>,
}

/// What the provider assigned to a booked event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: String,
    /// Join link, present when conferencing was granted.
    pub meeting_link: Option<String>,
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar authorization failed: {0}")]
    Auth(String),

    #[error("calendar request failed: {0}")]
    Request(String),

    #[error("calendar API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("calendar response carried no event id")]
    MissingEventId,
}

#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn create_event(&self, event: &NewCalendarEvent) -> Result<CreatedEvent, CalendarError>;
}
