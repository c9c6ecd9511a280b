use agency_core::model::{ContactRequest, ScheduleMeetingRequest};
use agency_core::validate::{validate_contact, validate_meeting};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Public contact form, meeting booking and the meeting listing.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_contact))
        .route("/schedule-meeting", post(schedule_meeting))
        .route("/admin/meetings", get(list_meetings))
}

async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let submission = validate_contact(&request).map_err(ApiError::Validation)?;

    state.contact().submit(submission).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Message sent successfully",
    })))
}

async fn schedule_meeting(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleMeetingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(request) = payload?;
    let request = validate_meeting(&request).map_err(ApiError::InvalidField)?;

    let meeting = state.meeting().schedule(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "meetingLink": meeting.meeting_link,
            "eventId": meeting.calendar_event_id,
        })),
    ))
}

async fn list_meetings(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let meetings = state
        .store()
        .list_meetings()
        .await
        .map_err(ApiError::MeetingsUnavailable)?;

    Ok(Json(json!({
        "success": true,
        "meetings": meetings,
    })))
}
