//! Recording fakes for the calendar and mail collaborators.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::calendar::{CalendarClient, CalendarError, CreatedEvent, NewCalendarEvent};
use crate::notify::{EmailMessage, MailError, Mailer};

/// Keeps every message it is asked to send. Messages to `fail_for` are
/// rejected (and not kept).
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_for: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(address: &str) -> Self {
        Self {
            sent: Mutex::default(),
            fail_for: Some(address.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            return Err(MailError::Transport(format!("relay refused {}", message.to)));
        }
        self.sent.lock().expect("mailer lock").push(message.clone());
        Ok(())
    }
}

#[derive(Debug)]
enum Reply {
    Sequential,
    Fixed(String),
    Fail(String),
}

/// Books nothing; answers with `evt-1`, `evt-2`, ... and a Meet-style link.
#[derive(Debug)]
pub struct FakeCalendar {
    requests: Mutex<Vec<NewCalendarEvent>>,
    counter: AtomicUsize,
    reply: Reply,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::with_reply(Reply::Sequential)
    }

    /// Every booking returns the same event id.
    pub fn with_fixed_id(id: &str) -> Self {
        Self::with_reply(Reply::Fixed(id.to_string()))
    }

    /// Every booking fails with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            requests: Mutex::default(),
            counter: AtomicUsize::new(0),
            reply,
        }
    }

    pub fn requests(&self) -> Vec<NewCalendarEvent> {
        self.requests.lock().expect("calendar lock").clone()
    }
}

impl Default for FakeCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarClient for FakeCalendar {
    async fn create_event(&self, event: &NewCalendarEvent) -> Result<CreatedEvent, CalendarError> {
        self.requests
            .lock()
            .expect("calendar lock")
            .push(event.clone());

        let id = match &self.reply {
            Reply::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                format!("evt-{n}")
            }
            Reply::Fixed(id) => id.clone(),
            Reply::Fail(message) => {
                return Err(CalendarError::Api {
                    status: 403,
                    message: message.clone(),
                })
            }
        };
        Ok(CreatedEvent {
            meeting_link: Some(format!("https://meet.google.com/{id}")),
            id,
        })
    }
}
