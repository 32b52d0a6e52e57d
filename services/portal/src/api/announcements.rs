//! Announcement board handlers.
//!
//! # Purpose
//! Lists the announcements visible to the caller, creates announcements after
//! the audience rules pass, and records read receipts.
use crate::api::error::{
    ApiError, api_internal, api_not_found, api_store_error, api_validation_error,
};
use crate::api::types::{AnnouncementCreateRequest, AnnouncementListResponse, AnnouncementQuery};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::session::require_session;
use crate::model::Announcement;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use internhub_policy::{
    Identity, allowed_audiences, can_view_announcement, validate_announcement_target,
};

pub(crate) fn visible(identity: &Identity, announcement: &Announcement) -> bool {
    can_view_announcement(
        identity,
        announcement.target_audience,
        announcement.department.as_deref(),
    )
}

#[utoipa::path(
    get,
    path = "/v1/announcements",
    tag = "announcements",
    params(AnnouncementQuery),
    responses(
        (
            status = 200,
            description = "Announcements visible to the caller",
            body = AnnouncementListResponse
        ),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub(crate) async fn list_announcements(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AnnouncementQuery>,
) -> Result<Json<AnnouncementListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let visible_items: Vec<Announcement> = state
        .store
        .list_announcements()
        .await
        .map_err(|err| api_internal("failed to list announcements", &err))?
        .into_iter()
        .filter(|announcement| visible(identity, announcement))
        .collect();

    let unread_count = visible_items
        .iter()
        .filter(|announcement| !announcement.is_read_by(&identity.id))
        .count();
    let filter = query.filter.unwrap_or_default();
    let search = query.q.unwrap_or_default();
    let items = visible_items
        .into_iter()
        .filter(|announcement| announcement.matches_filter(filter, identity))
        .filter(|announcement| announcement.matches_query(&search))
        .collect();

    Ok(Json(AnnouncementListResponse {
        items,
        unread_count,
        allowed_audiences: allowed_audiences(identity.role).to_vec(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/announcements",
    tag = "announcements",
    request_body = AnnouncementCreateRequest,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 400, description = "Invalid announcement", body = ErrorResponse),
        (status = 403, description = "Audience not allowed for the caller", body = ErrorResponse)
    )
)]
pub(crate) async fn create_announcement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnnouncementCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;

    let scope =
        validate_announcement_target(identity, body.target_audience, body.department.as_deref())?;
    let title = body.title.trim();
    let content = body.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(api_validation_error("title and content are required"));
    }

    let announcement = Announcement::new(
        identity,
        title.to_string(),
        content.to_string(),
        scope,
        body.priority,
        body.pinned,
        Utc::now(),
    );
    let created = state
        .store
        .create_announcement(announcement)
        .await
        .map_err(|err| api_store_error("announcement", err))?;
    tracing::info!(
        announcement_id = %created.id,
        audience = %created.target_audience,
        author = %identity.id,
        "announcement created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/v1/announcements/{id}/read",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement identifier")),
    responses(
        (status = 200, description = "Read receipt recorded", body = Announcement),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    )
)]
pub(crate) async fn mark_announcement_read(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Announcement>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let announcement = state
        .store
        .get_announcement(&id)
        .await
        .map_err(|err| api_store_error("announcement", err))?;
    if !visible(&session.identity, &announcement) {
        return Err(api_not_found("announcement not found"));
    }
    let updated = state
        .store
        .mark_announcement_read(&id, &session.identity.id)
        .await
        .map_err(|err| api_store_error("announcement", err))?;
    Ok(Json(updated))
}
