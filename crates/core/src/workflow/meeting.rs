use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use super::{send_pair, WorkflowError};
use crate::calendar::{Attendee, CalendarClient, CreatedEvent, NewCalendarEvent, Visibility};
use crate::model::{Meeting, MeetingRequest, NewMeeting};
use crate::notify::templates::MeetingContext;
use crate::notify::{EmailMessage, EmailTemplate, MailSettings, Mailer, TemplateRenderer};
use crate::saga::{Saga, SagaError, Step};
use crate::store::MeetingStore;

const BOOK: Step = Step::uncompensated(
    "create_calendar_event",
    "calendar event stays booked and must be cancelled by hand",
);
const PERSIST: Step = Step::uncompensated("persist_meeting", "meeting record stays stored");
const RENDER: Step = Step::pure("render_emails");
const NOTIFY: Step = Step::uncompensated("send_emails", "a delivered email is not recalled");

const SCHEDULER_NAME: &str = "Meeting Scheduler";

/// Book a calendar event, record the meeting, and confirm it by email to the
/// attendee and the operator.
///
/// The calendar event is always created before the meeting record, so a
/// stored meeting always refers to an event that was actually booked.
pub struct MeetingWorkflow {
    store: Arc<dyn MeetingStore>,
    calendar: Arc<dyn CalendarClient>,
    mailer: Arc<dyn Mailer>,
    templates: Arc<TemplateRenderer>,
    mail: MailSettings,
    timezone: Tz,
}

impl MeetingWorkflow {
    pub fn new(
        store: Arc<dyn MeetingStore>,
        calendar: Arc<dyn CalendarClient>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<TemplateRenderer>,
        mail: MailSettings,
        timezone: Tz,
    ) -> Self {
        Self {
            store,
            calendar,
            mailer,
            templates,
            mail,
            timezone,
        }
    }

    pub async fn schedule(
        &self,
        request: MeetingRequest,
    ) -> Result<Meeting, SagaError<WorkflowError>> {
        let mut saga = Saga::new("schedule_meeting");

        let start = resolve_local(self.timezone, request.date.and_time(request.time));
        let end = start + Duration::minutes(i64::from(request.duration.minutes()));
        let event = self.event_for(&request, start, end);

        let created = saga
            .run(BOOK, async {
                self.calendar
                    .create_event(&event)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;
        tracing::info!(event_id = %created.id, "calendar event created");

        let new = NewMeeting {
            date: start,
            time: request.time_label.clone(),
            duration: request.duration,
            topic: request.topic.clone(),
            attendee_email: request.attendee_email.clone(),
            calendar_event_id: created.id.clone(),
            meeting_link: created.meeting_link.clone(),
        };
        let meeting = saga
            .run(PERSIST, async {
                self.store
                    .insert_meeting(&new)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;

        let (to_attendee, to_operator) = saga
            .run(RENDER, async { self.compose(&meeting, &created) })
            .await?;

        saga.run(NOTIFY, async {
            send_pair(self.mailer.as_ref(), &to_attendee, &to_operator)
                .await
                .map_err(WorkflowError::from)
        })
        .await?;

        tracing::info!(event_id = %meeting.calendar_event_id, "meeting scheduled");
        Ok(meeting)
    }

    fn event_for(
        &self,
        request: &MeetingRequest,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> NewCalendarEvent {
        NewCalendarEvent {
            summary: request.topic.clone(),
            description: format!("Scheduled meeting with {}", request.attendee_email),
            start,
            end,
            attendees: vec![
                Attendee {
                    email: request.attendee_email.clone(),
                    accepted: true,
                },
                Attendee {
                    email: self.mail.operator_address.clone(),
                    accepted: true,
                },
            ],
            guests_can_modify: false,
            guests_can_invite_others: false,
            visibility: Visibility::Private,
            conference_request_id: Some(format!("meet-{}", Uuid::new_v4())),
        }
    }

    fn compose(
        &self,
        meeting: &Meeting,
        created: &CreatedEvent,
    ) -> Result<(EmailMessage, EmailMessage), WorkflowError> {
        let when = meeting
            .date
            .with_timezone(&self.timezone)
            .format("%A, %B %-d, %Y at %H:%M %Z")
            .to_string();
        let ctx = MeetingContext {
            topic: &meeting.topic,
            start_date_time: &when,
            duration: meeting.duration.minutes(),
            meeting_link: created.meeting_link.as_deref(),
            attendee_email: &meeting.attendee_email,
            event_id: &created.id,
        };

        let to_attendee = EmailMessage {
            from_name: Some(SCHEDULER_NAME.to_string()),
            from_address: self.mail.sender_address.clone(),
            to: meeting.attendee_email.clone(),
            subject: format!("Meeting Confirmation: {}", meeting.topic),
            html: self.templates.render(EmailTemplate::MeetingAttendee, &ctx)?,
        };
        let to_operator = EmailMessage {
            from_name: Some(SCHEDULER_NAME.to_string()),
            from_address: self.mail.sender_address.clone(),
            to: self.mail.operator_address.clone(),
            subject: format!("[ADMIN] New Meeting Scheduled: {}", meeting.topic),
            html: self.templates.render(EmailTemplate::MeetingAdmin, &ctx)?,
        };
        Ok((to_attendee, to_operator))
    }
}

/// Interpret a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move forward by an hour.
fn resolve_local(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}
