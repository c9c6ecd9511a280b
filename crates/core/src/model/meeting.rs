use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::RecordId;

/// Raw body of `POST /contact/schedule-meeting`.
///
/// `duration` is kept as a JSON value because clients send it either as a
/// number or as a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<Value>,
    pub topic: Option<String>,
    pub attendee_email: Option<String>,
}

/// Allowed meeting lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum MeetingDuration {
    Fifteen,
    Thirty,
    FortyFive,
    Sixty,
}

impl MeetingDuration {
    pub const ALL: [MeetingDuration; 4] = [
        MeetingDuration::Fifteen,
        MeetingDuration::Thirty,
        MeetingDuration::FortyFive,
        MeetingDuration::Sixty,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            MeetingDuration::Fifteen => 15,
            MeetingDuration::Thirty => 30,
            MeetingDuration::FortyFive => 45,
            MeetingDuration::Sixty => 60,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.minutes() == minutes)
    }
}

impl From<MeetingDuration> for u32 {
    fn from(duration: MeetingDuration) -> Self {
        duration.minutes()
    }
}

impl TryFrom<u32> for MeetingDuration {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes).ok_or_else(|| format!("{minutes} is not an allowed duration"))
    }
}

impl fmt::Display for MeetingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

/// A validated scheduling request. Produced only by
/// [`validate_meeting`](crate::validate::meeting::validate_meeting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// The time exactly as submitted, e.g. `9:30`.
    pub time_label: String,
    pub duration: MeetingDuration,
    pub topic: String,
    /// Trimmed and lower-cased.
    pub attendee_email: String,
}

/// Everything needed to persist a meeting once its calendar event exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub date: DateTime<Utc>,
    pub time: String,
    pub duration: MeetingDuration,
    pub topic: String,
    pub attendee_email: String,
    pub calendar_event_id: String,
    pub meeting_link: Option<String>,
}

/// A stored meeting. `calendar_event_id` is unique across all meetings.
///
/// The internal id is not part of the public listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(skip_serializing)]
    pub id: RecordId,
    /// Start of the meeting in UTC.
    pub date: DateTime<Utc>,
    pub time: String,
    pub duration: MeetingDuration,
    pub topic: String,
    pub attendee_email: String,
    pub calendar_event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}
