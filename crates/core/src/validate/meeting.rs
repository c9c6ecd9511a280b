use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;

use super::{is_email, non_blank, normalize_email, FieldError};
use crate::model::{MeetingDuration, MeetingRequest, ScheduleMeetingRequest};

static CALENDAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));

static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h>[01]?[0-9]|2[0-3]):(?P<m>[0-5][0-9])$").expect("static regex")
});

const DATE_MSG: &str = "Valid ISO8601 date required (YYYY-MM-DD)";
const TIME_MSG: &str = "Time must be HH:MM format";
const DURATION_MSG: &str = "Duration must be 15, 30, 45, or 60 minutes";
const TOPIC_MSG: &str = "Meeting topic required";
const EMAIL_MSG: &str = "Valid email required";

/// Check a scheduling request in field order: date, time, duration, topic,
/// attendee email. Only the first failure is returned.
pub fn validate_meeting(request: &ScheduleMeetingRequest) -> Result<MeetingRequest, FieldError> {
    let date = request
        .date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| FieldError::body("date", DATE_MSG))?;

    let time_label = request.time.as_deref().unwrap_or_default();
    let time = parse_time(time_label).ok_or_else(|| FieldError::body("time", TIME_MSG))?;

    let duration = request
        .duration
        .as_ref()
        .and_then(parse_duration)
        .ok_or_else(|| FieldError::body("duration", DURATION_MSG))?;

    let topic = non_blank(request.topic.as_deref())
        .ok_or_else(|| FieldError::body("topic", TOPIC_MSG))?;

    let attendee_email = request
        .attendee_email
        .as_deref()
        .map(str::trim)
        .filter(|e| is_email(e))
        .map(normalize_email)
        .ok_or_else(|| FieldError::body("attendeeEmail", EMAIL_MSG))?;

    Ok(MeetingRequest {
        date,
        time,
        time_label: time_label.to_string(),
        duration,
        topic: topic.to_string(),
        attendee_email,
    })
}

/// `YYYY-MM-DD`, or a full RFC 3339 timestamp whose calendar date is used.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if CALENDAR_DATE.is_match(raw) {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.date_naive())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let caps = CLOCK_TIME.captures(raw)?;
    let hour = caps["h"].parse().ok()?;
    let minute = caps["m"].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Accepts `30` as well as `"30"`.
fn parse_duration(raw: &Value) -> Option<MeetingDuration> {
    let minutes = match raw {
        Value::Number(n) => match n.as_u64() {
            Some(whole) => whole,
            None => {
                let float = n.as_f64()?;
                if float.fract() != 0.0 || float < 0.0 {
                    return None;
                }
                float as u64
            }
        },
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    MeetingDuration::from_minutes(u32::try_from(minutes).ok()?)
}
