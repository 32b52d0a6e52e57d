//! Navigation, user directory, and dashboard handlers.
//!
//! # Purpose
//! Role-shaped views that aggregate over the other collections. The dashboard
//! only reports a section when the caller's role has the matching menu item.
use crate::api::announcements;
use crate::api::certificates::visible_certificates;
use crate::api::error::{ApiError, api_forbidden, api_internal};
use crate::api::meetings::visible_meetings;
use crate::api::types::{DashboardResponse, NavEntry, NavigationResponse, UserListResponse};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::session::require_session;
use crate::model::{Announcement, CertificateStats};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use internhub_policy::{
    Identity, NavItem, can_list_users, can_view_user, chat_contact_roles, navigation_for,
};

const DASHBOARD_PREVIEW_LEN: usize = 3;

#[utoipa::path(
    get,
    path = "/v1/navigation",
    tag = "directory",
    responses(
        (
            status = 200,
            description = "Menu entries for the caller's role",
            body = NavigationResponse
        )
    )
)]
pub(crate) async fn navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NavigationResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let items = navigation_for(session.identity.role)
        .into_iter()
        .map(|item| NavEntry {
            id: item.id().to_string(),
            label: item.label().to_string(),
        })
        .collect();
    Ok(Json(NavigationResponse { items }))
}

async fn visible_users(state: &AppState, identity: &Identity) -> Result<Vec<Identity>, ApiError> {
    let mut users: Vec<Identity> = state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?
        .into_iter()
        .map(|account| account.identity)
        .filter(|target| can_view_user(identity, target))
        .collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(users)
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "directory",
    responses(
        (status = 200, description = "Users the caller may manage", body = UserListResponse),
        (status = 403, description = "Role has no user directory", body = ErrorResponse)
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    if !can_list_users(session.identity.role) {
        return Err(api_forbidden("user directory is not available for this role"));
    }
    let items = visible_users(&state, &session.identity).await?;
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/dashboard",
    tag = "directory",
    responses(
        (status = 200, description = "Summary cards for the caller", body = DashboardResponse)
    )
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = session.identity;
    let now = Utc::now();

    let meetings = visible_meetings(&state, &identity).await?;
    let meetings_total = meetings.len();
    let upcoming_meetings = meetings
        .into_iter()
        .filter(|meeting| meeting.is_upcoming(now))
        .take(DASHBOARD_PREVIEW_LEN)
        .collect();

    let announcements: Vec<Announcement> = state
        .store
        .list_announcements()
        .await
        .map_err(|err| api_internal("failed to list announcements", &err))?
        .into_iter()
        .filter(|announcement| announcements::visible(&identity, announcement))
        .collect();
    let unread_announcements = announcements
        .iter()
        .filter(|announcement| !announcement.is_read_by(&identity.id))
        .count();
    let pinned_announcements = announcements
        .into_iter()
        .filter(|announcement| announcement.pinned)
        .take(DASHBOARD_PREVIEW_LEN)
        .collect();

    let contact_roles = chat_contact_roles(identity.role);
    let unread_messages = if contact_roles.is_empty() {
        None
    } else {
        let messages = state
            .store
            .list_messages_for(&identity.id)
            .await
            .map_err(|err| api_internal("failed to list messages", &err))?;
        Some(
            messages
                .iter()
                .filter(|message| message.receiver_id == identity.id && !message.read)
                .filter(|message| contact_roles.contains(&message.sender_role))
                .count(),
        )
    };

    let certificates = if NavItem::Certificates.visible_to(identity.role) {
        let visible = visible_certificates(&state, &identity).await?;
        Some(CertificateStats::tally(&visible))
    } else {
        None
    };

    let visible_users = if can_list_users(identity.role) {
        Some(visible_users(&state, &identity).await?.len())
    } else {
        None
    };

    Ok(Json(DashboardResponse {
        role_label: identity.role.label().to_string(),
        user: identity,
        meetings_total,
        upcoming_meetings,
        unread_announcements,
        pinned_announcements,
        unread_messages,
        certificates,
        visible_users,
    }))
}
