//! OpenAPI schema aggregation for the portal API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for docs
//! and client generation.
use crate::api::{
    announcements, certificates, directory, meetings, messages, system,
    types::{
        AnnouncementCreateRequest, AnnouncementListResponse, AttendanceListResponse,
        CertificateCreateRequest, CertificateDownloadResponse, CertificateListResponse,
        CodeIssuedResponse, ContactListResponse, ConversationListResponse, DashboardResponse,
        ErrorResponse, HealthStatus, LoginRequest, MarkReadRequest, MarkReadResponse,
        MeetingCreateRequest, MeetingListResponse, MessageCreateRequest, MessageListResponse,
        NavEntry, NavigationResponse, PasswordResetRequest, PasswordResetVerifyRequest,
        RegisterRequest, SessionResponse, SystemInfo, UserListResponse, VerifyCodeRequest,
    },
};
use crate::auth::handlers;
use crate::model::{
    Announcement, AnnouncementFilter, AttendanceStatus, AttendanceView, AuthorSummary,
    Certificate, CertificateKind, CertificateStats, CertificateStatus, ChatMessage, Conversation,
    Meeting, MeetingStatus, OrganizerSummary, Priority,
};
use internhub_policy::{Audience, Identity, NavItem, Role};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "internhub-portal",
        version = "v1",
        description = "InternHub internship portal HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        handlers::login,
        handlers::register,
        handlers::register_verify,
        handlers::logout,
        handlers::me,
        handlers::password_reset,
        handlers::password_reset_verify,
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::mark_announcement_read,
        certificates::list_certificates,
        certificates::certificate_stats,
        certificates::upload_certificate,
        certificates::publish_certificate,
        certificates::download_certificate,
        messages::list_contacts,
        messages::list_conversations,
        messages::list_messages,
        messages::send_message,
        messages::mark_messages_read,
        meetings::list_meetings,
        meetings::create_meeting,
        meetings::get_meeting,
        meetings::cancel_meeting,
        meetings::join_meeting,
        meetings::leave_meeting,
        meetings::meeting_attendance,
        directory::navigation,
        directory::list_users,
        directory::dashboard
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        Role,
        Identity,
        Audience,
        NavItem,
        LoginRequest,
        SessionResponse,
        RegisterRequest,
        CodeIssuedResponse,
        VerifyCodeRequest,
        PasswordResetRequest,
        PasswordResetVerifyRequest,
        Priority,
        AuthorSummary,
        Announcement,
        AnnouncementFilter,
        AnnouncementCreateRequest,
        AnnouncementListResponse,
        CertificateKind,
        CertificateStatus,
        Certificate,
        CertificateStats,
        CertificateCreateRequest,
        CertificateListResponse,
        CertificateDownloadResponse,
        ChatMessage,
        Conversation,
        MessageCreateRequest,
        MessageListResponse,
        MarkReadRequest,
        MarkReadResponse,
        ContactListResponse,
        ConversationListResponse,
        MeetingStatus,
        AttendanceStatus,
        OrganizerSummary,
        Meeting,
        AttendanceView,
        MeetingCreateRequest,
        MeetingListResponse,
        AttendanceListResponse,
        NavEntry,
        NavigationResponse,
        UserListResponse,
        DashboardResponse
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "auth", description = "Login, registration, and password reset"),
        (name = "announcements", description = "Announcement board"),
        (name = "certificates", description = "Offer letters and completion certificates"),
        (name = "chat", description = "Direct messages"),
        (name = "meetings", description = "Meetings and attendance"),
        (name = "directory", description = "Navigation, users, and dashboard")
    )
)]
pub struct ApiDoc;
