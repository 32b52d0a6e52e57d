//! Portal HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::session_token::SessionSigner;
use crate::observability;
use crate::store::PortalStore;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

/// Session and one-time code settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl: std::time::Duration,
    pub code_ttl: chrono::Duration,
    pub max_code_attempts: u32,
    /// Return issued codes in API responses. Development only.
    pub echo_codes: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: std::time::Duration::from_secs(8 * 60 * 60),
            code_ttl: chrono::Duration::minutes(10),
            max_code_attempts: 5,
            echo_codes: false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub store: Arc<dyn PortalStore + Send + Sync>,
    pub signer: Arc<SessionSigner>,
    pub auth: AuthSettings,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let request_id = request
                .headers()
                .get(api::request_id::REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = %request_id
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route("/v1/system/info", get(api::system::system_info))
        .route("/v1/system/health", get(api::system::system_health))
        .route("/v1/login", post(auth::handlers::login))
        .route("/v1/register", post(auth::handlers::register))
        .route("/v1/register/verify", post(auth::handlers::register_verify))
        .route("/v1/logout", post(auth::handlers::logout))
        .route("/v1/me", get(auth::handlers::me))
        .route("/v1/password-reset", post(auth::handlers::password_reset))
        .route(
            "/v1/password-reset/verify",
            post(auth::handlers::password_reset_verify),
        )
        .route(
            "/v1/announcements",
            get(api::announcements::list_announcements)
                .post(api::announcements::create_announcement),
        )
        .route(
            "/v1/announcements/:id/read",
            post(api::announcements::mark_announcement_read),
        )
        .route(
            "/v1/certificates",
            get(api::certificates::list_certificates).post(api::certificates::upload_certificate),
        )
        .route(
            "/v1/certificates/stats",
            get(api::certificates::certificate_stats),
        )
        .route(
            "/v1/certificates/:id/publish",
            post(api::certificates::publish_certificate),
        )
        .route(
            "/v1/certificates/:id/download",
            post(api::certificates::download_certificate),
        )
        .route("/v1/contacts", get(api::messages::list_contacts))
        .route("/v1/conversations", get(api::messages::list_conversations))
        .route(
            "/v1/messages",
            get(api::messages::list_messages).post(api::messages::send_message),
        )
        .route("/v1/messages/read", post(api::messages::mark_messages_read))
        .route(
            "/v1/meetings",
            get(api::meetings::list_meetings).post(api::meetings::create_meeting),
        )
        .route("/v1/meetings/:id", get(api::meetings::get_meeting))
        .route(
            "/v1/meetings/:id/cancel",
            post(api::meetings::cancel_meeting),
        )
        .route("/v1/meetings/:id/join", post(api::meetings::join_meeting))
        .route("/v1/meetings/:id/leave", post(api::meetings::leave_meeting))
        .route(
            "/v1/meetings/:id/attendance",
            get(api::meetings::meeting_attendance),
        )
        .route("/v1/navigation", get(api::directory::navigation))
        .route("/v1/users", get(api::directory::list_users))
        .route("/v1/dashboard", get(api::directory::dashboard))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(api::request_id::scope_request_id))
        .with_state(state)
}
