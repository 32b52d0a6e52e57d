//! Meeting handlers.
//!
//! # Purpose
//! Scheduling, listing, cancellation, and presence tracking for meetings.
//!
//! # Key invariants
//! - Status is recomputed from the clock on every read; stored status is only
//!   authoritative for cancellation.
//! - Participants only ever see their own attendance entry.
use crate::api::error::{
    ApiError, api_forbidden, api_internal, api_not_found, api_store_error, api_validation_error,
};
use crate::api::types::{
    AttendanceListResponse, MeetingCreateRequest, MeetingListResponse, MeetingQuery,
};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::session::require_session;
use crate::model::{Meeting, MeetingStatus, OrganizerSummary};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use internhub_policy::{Identity, Role, can_schedule_meeting, can_view_meeting};
use std::collections::HashMap;

const DEFAULT_MEETING_HOST: &str = "https://meet.example.com";

fn visible(identity: &Identity, meeting: &Meeting) -> bool {
    can_view_meeting(
        identity,
        &meeting.organizer.id,
        meeting.department.as_deref(),
        &meeting.attendees,
    )
}

fn can_manage(identity: &Identity, meeting: &Meeting) -> bool {
    identity.id == meeting.organizer.id || can_schedule_meeting(identity.role)
}

/// Load a meeting the caller may see, with its status refreshed.
async fn load_visible(
    state: &AppState,
    identity: &Identity,
    id: &str,
) -> Result<Meeting, ApiError> {
    let mut meeting = state
        .store
        .get_meeting(id)
        .await
        .map_err(|err| api_store_error("meeting", err))?;
    if !visible(identity, &meeting) {
        return Err(api_not_found("meeting not found"));
    }
    meeting.refresh_status(Utc::now());
    Ok(meeting)
}

pub(crate) async fn visible_meetings(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<Meeting>, ApiError> {
    let now = Utc::now();
    Ok(state
        .store
        .list_meetings()
        .await
        .map_err(|err| api_internal("failed to list meetings", &err))?
        .into_iter()
        .filter(|meeting| visible(identity, meeting))
        .map(|mut meeting| {
            meeting.refresh_status(now);
            meeting
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/v1/meetings",
    tag = "meetings",
    params(MeetingQuery),
    responses(
        (
            status = 200,
            description = "Meetings visible to the caller, by start time",
            body = MeetingListResponse
        )
    )
)]
pub(crate) async fn list_meetings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MeetingQuery>,
) -> Result<Json<MeetingListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let now = Utc::now();
    let upcoming_only = query.upcoming.unwrap_or(false);
    let items = visible_meetings(&state, &session.identity)
        .await?
        .into_iter()
        .filter(|meeting| {
            query
                .date
                .is_none_or(|date| meeting.start_time.date_naive() == date)
        })
        .filter(|meeting| !upcoming_only || meeting.is_upcoming(now))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    Ok(Json(MeetingListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/meetings",
    tag = "meetings",
    request_body = MeetingCreateRequest,
    responses(
        (status = 201, description = "Meeting scheduled", body = Meeting),
        (status = 400, description = "Invalid meeting", body = ErrorResponse),
        (status = 403, description = "Caller may not schedule meetings", body = ErrorResponse)
    )
)]
pub(crate) async fn create_meeting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MeetingCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    if !can_schedule_meeting(identity.role) {
        return Err(api_forbidden("only operations leads and administrators may schedule meetings"));
    }
    let title = body.title.trim();
    if title.is_empty() {
        return Err(api_validation_error("title is required"));
    }
    if body.end_time <= body.start_time {
        return Err(api_validation_error("end_time must be after start_time"));
    }
    let department = body
        .department
        .map(|department| department.trim().to_string())
        .filter(|department| !department.is_empty());

    let mut attendees: Vec<String> = Vec::with_capacity(body.attendees.len());
    for attendee in body.attendees {
        if attendees.contains(&attendee) {
            continue;
        }
        match state.store.get_user(&attendee).await {
            Ok(_) => attendees.push(attendee),
            Err(StoreError::NotFound(_)) => {
                return Err(api_validation_error(&format!("unknown attendee {attendee}")));
            }
            Err(err) => return Err(api_internal("failed to load attendee", &err)),
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    let meeting_link = body
        .meeting_link
        .filter(|link| !link.trim().is_empty())
        .unwrap_or_else(|| format!("{DEFAULT_MEETING_HOST}/{id}"));
    let mut meeting = Meeting {
        id,
        title: title.to_string(),
        description: body.description.trim().to_string(),
        start_time: body.start_time,
        end_time: body.end_time,
        organizer: OrganizerSummary::from(identity),
        department,
        attendees,
        meeting_link,
        status: MeetingStatus::Scheduled,
        attendance: Vec::new(),
    };
    meeting.refresh_status(Utc::now());
    let created = state
        .store
        .create_meeting(meeting)
        .await
        .map_err(|err| api_store_error("meeting", err))?;
    tracing::info!(
        meeting_id = %created.id,
        organizer = %identity.id,
        start = %created.start_time,
        "meeting scheduled"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/v1/meetings/{id}",
    tag = "meetings",
    params(("id" = String, Path, description = "Meeting identifier")),
    responses(
        (status = 200, description = "Meeting", body = Meeting),
        (status = 404, description = "Meeting not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_meeting(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Meeting>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let meeting = load_visible(&state, &session.identity, &id).await?;
    Ok(Json(meeting))
}

#[utoipa::path(
    post,
    path = "/v1/meetings/{id}/cancel",
    tag = "meetings",
    params(("id" = String, Path, description = "Meeting identifier")),
    responses(
        (status = 200, description = "Meeting cancelled", body = Meeting),
        (status = 403, description = "Caller may not cancel this meeting", body = ErrorResponse),
        (status = 409, description = "Meeting already completed", body = ErrorResponse)
    )
)]
pub(crate) async fn cancel_meeting(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Meeting>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let meeting = load_visible(&state, &session.identity, &id).await?;
    if !can_manage(&session.identity, &meeting) {
        return Err(api_forbidden("only the organizer may cancel this meeting"));
    }
    let cancelled = state
        .store
        .cancel_meeting(&id, Utc::now())
        .await
        .map_err(|err| api_store_error("meeting", err))?;
    tracing::info!(meeting_id = %id, user_id = %session.identity.id, "meeting cancelled");
    Ok(Json(cancelled))
}

#[utoipa::path(
    post,
    path = "/v1/meetings/{id}/join",
    tag = "meetings",
    params(("id" = String, Path, description = "Meeting identifier")),
    responses(
        (status = 200, description = "Presence interval opened", body = Meeting),
        (status = 404, description = "Meeting not found", body = ErrorResponse),
        (status = 409, description = "Meeting cancelled or ended", body = ErrorResponse)
    )
)]
pub(crate) async fn join_meeting(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Meeting>, ApiError> {
    let session = require_session(&state, &headers).await?;
    load_visible(&state, &session.identity, &id).await?;
    let now = Utc::now();
    let mut meeting = state
        .store
        .join_meeting(&id, &session.identity, now)
        .await
        .map_err(|err| api_store_error("meeting", err))?;
    meeting.refresh_status(now);
    tracing::debug!(meeting_id = %id, user_id = %session.identity.id, "meeting joined");
    Ok(Json(meeting))
}

#[utoipa::path(
    post,
    path = "/v1/meetings/{id}/leave",
    tag = "meetings",
    params(("id" = String, Path, description = "Meeting identifier")),
    responses(
        (status = 200, description = "Presence interval closed", body = Meeting),
        (status = 404, description = "Meeting not found", body = ErrorResponse),
        (status = 409, description = "Caller is not in the meeting", body = ErrorResponse)
    )
)]
pub(crate) async fn leave_meeting(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Meeting>, ApiError> {
    let session = require_session(&state, &headers).await?;
    load_visible(&state, &session.identity, &id).await?;
    let now = Utc::now();
    let mut meeting = state
        .store
        .leave_meeting(&id, &session.identity.id, now)
        .await
        .map_err(|err| api_store_error("meeting", err))?;
    meeting.refresh_status(now);
    tracing::debug!(meeting_id = %id, user_id = %session.identity.id, "meeting left");
    Ok(Json(meeting))
}

#[utoipa::path(
    get,
    path = "/v1/meetings/{id}/attendance",
    tag = "meetings",
    params(("id" = String, Path, description = "Meeting identifier")),
    responses(
        (
            status = 200,
            description = "Attendance entries the caller may see",
            body = AttendanceListResponse
        ),
        (status = 404, description = "Meeting not found", body = ErrorResponse)
    )
)]
pub(crate) async fn meeting_attendance(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AttendanceListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let meeting = load_visible(&state, identity, &id).await?;
    let names: HashMap<String, String> = state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?
        .into_iter()
        .map(|account| (account.identity.id, account.identity.name))
        .collect();

    let mut items = meeting.attendance_views(Utc::now(), |user_id| names.get(user_id).cloned());
    if identity.role == Role::Participant && identity.id != meeting.organizer.id {
        items.retain(|view| view.user_id == identity.id);
    }
    Ok(Json(AttendanceListResponse {
        meeting_id: meeting.id,
        items,
    }))
}
