//! HTTP API request/response types.
//!
//! # Purpose
//! Defines payload shapes for the portal REST API and OpenAPI schema
//! generation. Domain records are serialized as-is from `crate::model`.
use crate::model::{
    Announcement, AnnouncementFilter, AttendanceView, Certificate, CertificateKind,
    CertificateStats, CertificateStatus, ChatMessage, Conversation, Meeting, Priority,
};
use chrono::{DateTime, NaiveDate, Utc};
use internhub_policy::{Audience, Identity, Role};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub storage_backend: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionResponse {
    pub token: String,
    /// Token expiry in seconds since the Unix epoch.
    pub expires_at: i64,
    pub user: Identity,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

/// Issued one-time code challenge. `code` is only present when the service
/// runs with code echoing enabled.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CodeIssuedResponse {
    pub challenge_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct VerifyCodeRequest {
    pub challenge_id: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PasswordResetVerifyRequest {
    pub challenge_id: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AnnouncementCreateRequest {
    pub title: String,
    pub content: String,
    pub target_audience: Audience,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub pinned: bool,
}

fn default_priority() -> Priority {
    Priority::Medium
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementQuery {
    pub filter: Option<AnnouncementFilter>,
    /// Case-insensitive match on title, content, or author name.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementListResponse {
    pub items: Vec<Announcement>,
    /// Unread among all announcements visible to the caller, before filtering.
    pub unread_count: usize,
    /// Audiences the caller may target; empty when the caller cannot post.
    pub allowed_audiences: Vec<Audience>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CertificateCreateRequest {
    pub intern_id: String,
    pub kind: CertificateKind,
    pub file_name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    /// Make the certificate downloadable immediately.
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CertificateQuery {
    pub kind: Option<CertificateKind>,
    pub status: Option<CertificateStatus>,
    /// Case-insensitive match on participant name, file name, or department.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CertificateListResponse {
    pub items: Vec<Certificate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CertificateDownloadResponse {
    pub file_name: String,
    pub file_url: String,
    pub certificate: Certificate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MessageCreateRequest {
    pub receiver_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageQuery {
    /// The other participant of the conversation.
    pub contact: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    pub items: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MarkReadRequest {
    pub contact_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    pub updated: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactListResponse {
    pub items: Vec<Identity>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationListResponse {
    pub items: Vec<Conversation>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MeetingCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Generated when omitted.
    #[serde(default)]
    pub meeting_link: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MeetingQuery {
    /// Only meetings starting on this UTC date.
    pub date: Option<NaiveDate>,
    /// Only meetings that have not started yet.
    pub upcoming: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeetingListResponse {
    pub items: Vec<Meeting>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceListResponse {
    pub meeting_id: String,
    pub items: Vec<AttendanceView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavEntry {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigationResponse {
    pub items: Vec<NavEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<Identity>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub user: Identity,
    pub role_label: String,
    pub meetings_total: usize,
    pub upcoming_meetings: Vec<Meeting>,
    pub unread_announcements: usize,
    pub pinned_announcements: Vec<Announcement>,
    /// `None` when the role has no chat.
    pub unread_messages: Option<usize>,
    /// `None` when the role cannot see certificates.
    pub certificates: Option<CertificateStats>,
    /// `None` when the role cannot open the user directory.
    pub visible_users: Option<usize>,
}
