use std::time::{Duration, Instant};

use agency_core::calendar::{
    CalendarClient, CalendarError, CreatedEvent, NewCalendarEvent, Visibility,
};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Refresh this long before the provider says the token expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// OAuth client credentials plus a long-lived refresh token.
#[derive(Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

struct AccessToken {
    value: String,
    refresh_after: Instant,
}

/// Books events on the primary calendar of the authorized Google account.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    credentials: GoogleCredentials,
    token_url: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for GoogleCalendarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendarClient")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GoogleCalendarClient {
    pub fn new(credentials: GoogleCredentials) -> Self {
        Self::with_endpoints(credentials, DEFAULT_TOKEN_URL, DEFAULT_API_BASE)
    }

    /// Point the client at other OAuth and Calendar endpoints.
    pub fn with_endpoints(
        credentials: GoogleCredentials,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            token_url: token_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_after {
                return Ok(token.value.clone());
            }
        }

        debug!("refreshing Google access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(CalendarError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| CalendarError::Auth(format!("malformed token response: {e}")))?;

        let lifetime = Duration::from_secs(grant.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(AccessToken {
            value: grant.access_token.clone(),
            refresh_after: Instant::now() + lifetime,
        });
        Ok(grant.access_token)
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn create_event(&self, event: &NewCalendarEvent) -> Result<CreatedEvent, CalendarError> {
        let token = self.access_token().await?;
        let url = format!("{}/calendars/primary/events", self.api_base);
        let body = EventBody::from(event);

        let response = self
            .http
            .post(&url)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "calendar insert rejected");
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| CalendarError::Request(format!("malformed event response: {e}")))?;

        let id = inserted
            .id
            .filter(|id| !id.is_empty())
            .ok_or(CalendarError::MissingEventId)?;
        let meeting_link = inserted.hangout_link.or_else(|| {
            inserted.conference_data.and_then(|c| {
                c.entry_points
                    .into_iter()
                    .find(|e| e.entry_point_type == "video")
                    .map(|e| e.uri)
            })
        });

        info!(event_id = %id, has_link = meeting_link.is_some(), "calendar event inserted");
        Ok(CreatedEvent { id, meeting_link })
    }
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime,
    end: EventTime,
    attendees: Vec<EventAttendee<'a>>,
    guests_can_invite_others: bool,
    guests_can_modify: bool,
    visibility: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conference_data: Option<ConferenceData<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventAttendee<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_status: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConferenceData<'a> {
    create_request: CreateRequest<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest<'a> {
    request_id: &'a str,
    conference_solution_key: SolutionKey,
}

#[derive(Serialize)]
struct SolutionKey {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a NewCalendarEvent> for EventBody<'a> {
    fn from(event: &'a NewCalendarEvent) -> Self {
        let at = |t: &chrono::DateTime<chrono::Utc>| EventTime {
            date_time: t.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: "UTC",
        };
        Self {
            summary: &event.summary,
            description: &event.description,
            start: at(&event.start),
            end: at(&event.end),
            attendees: event
                .attendees
                .iter()
                .map(|a| EventAttendee {
                    email: &a.email,
                    response_status: a.accepted.then_some("accepted"),
                })
                .collect(),
            guests_can_invite_others: event.guests_can_invite_others,
            guests_can_modify: event.guests_can_modify,
            visibility: match event.visibility {
                Visibility::Default => "default",
                Visibility::Private => "private",
            },
            conference_data: event.conference_request_id.as_deref().map(|request_id| {
                ConferenceData {
                    create_request: CreateRequest {
                        request_id,
                        conference_solution_key: SolutionKey {
                            kind: "hangoutsMeet",
                        },
                    },
                }
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: Option<String>,
    hangout_link: Option<String>,
    conference_data: Option<InsertedConference>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedConference {
    #[serde(default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryPoint {
    entry_point_type: String,
    uri: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
