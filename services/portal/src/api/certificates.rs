//! Certificate handlers.
//!
//! # Purpose
//! Upload, publish, list, and download certificate records. Administrators
//! see every record; participants see only their own.
//!
//! # Key invariants
//! - Only the owning participant's download advances the status to
//!   `downloaded`; administrator downloads leave it untouched.
//! - Pending certificates cannot be downloaded by anyone.
use crate::api::error::{
    ApiError, api_forbidden, api_internal, api_invalid_transition, api_not_found,
    api_store_error, api_validation_error,
};
use crate::api::types::{
    CertificateCreateRequest, CertificateDownloadResponse, CertificateListResponse,
    CertificateQuery,
};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::session::require_session;
use crate::model::{Certificate, CertificateStats, CertificateStatus};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use internhub_policy::{
    Identity, Role, can_download_certificate, can_upload_certificate, can_view_certificate,
};

pub(crate) async fn visible_certificates(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<Certificate>, ApiError> {
    Ok(state
        .store
        .list_certificates()
        .await
        .map_err(|err| api_internal("failed to list certificates", &err))?
        .into_iter()
        .filter(|certificate| can_view_certificate(identity, &certificate.intern_id))
        .collect())
}

#[utoipa::path(
    get,
    path = "/v1/certificates",
    tag = "certificates",
    params(CertificateQuery),
    responses(
        (
            status = 200,
            description = "Certificates visible to the caller, newest first",
            body = CertificateListResponse
        ),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub(crate) async fn list_certificates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CertificateQuery>,
) -> Result<Json<CertificateListResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let search = query.q.unwrap_or_default();
    let items = visible_certificates(&state, &session.identity)
        .await?
        .into_iter()
        .filter(|certificate| query.kind.is_none_or(|kind| certificate.kind == kind))
        .filter(|certificate| query.status.is_none_or(|status| certificate.status == status))
        .filter(|certificate| certificate.matches_query(&search))
        .collect();
    Ok(Json(CertificateListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/certificates/stats",
    tag = "certificates",
    responses(
        (
            status = 200,
            description = "Counts by status over the caller's visible certificates",
            body = CertificateStats
        )
    )
)]
pub(crate) async fn certificate_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CertificateStats>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let certificates = visible_certificates(&state, &session.identity).await?;
    Ok(Json(CertificateStats::tally(&certificates)))
}

#[utoipa::path(
    post,
    path = "/v1/certificates",
    tag = "certificates",
    request_body = CertificateCreateRequest,
    responses(
        (status = 201, description = "Certificate uploaded", body = Certificate),
        (status = 400, description = "Unknown participant or bad input", body = ErrorResponse),
        (status = 403, description = "Caller may not upload", body = ErrorResponse)
    )
)]
pub(crate) async fn upload_certificate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CertificateCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    if !can_upload_certificate(session.identity.role) {
        return Err(api_forbidden("only administrators may upload certificates"));
    }
    let file_name = body.file_name.trim();
    if file_name.is_empty() {
        return Err(api_validation_error("file_name is required"));
    }

    let owner = match state.store.get_user(&body.intern_id).await {
        Ok(account) => account.identity,
        Err(StoreError::NotFound(_)) => {
            return Err(api_validation_error("intern_id does not name a participant"));
        }
        Err(err) => return Err(api_internal("failed to load participant", &err)),
    };
    if owner.role != Role::Participant {
        return Err(api_validation_error("intern_id does not name a participant"));
    }

    let certificate = Certificate {
        id: uuid::Uuid::new_v4().to_string(),
        intern_id: owner.id,
        intern_name: owner.name,
        intern_email: owner.email,
        department: owner.department,
        kind: body.kind,
        file_name: file_name.to_string(),
        file_url: body
            .file_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("/files/{file_name}")),
        uploaded_by: session.identity.name.clone(),
        status: if body.publish {
            CertificateStatus::Available
        } else {
            CertificateStatus::Pending
        },
        uploaded_at: Utc::now(),
        downloaded_at: None,
    };
    let created = state
        .store
        .create_certificate(certificate)
        .await
        .map_err(|err| api_store_error("certificate", err))?;
    tracing::info!(
        certificate_id = %created.id,
        intern_id = %created.intern_id,
        kind = created.kind.as_str(),
        "certificate uploaded"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/v1/certificates/{id}/publish",
    tag = "certificates",
    params(("id" = String, Path, description = "Certificate identifier")),
    responses(
        (status = 200, description = "Certificate available for download", body = Certificate),
        (status = 403, description = "Caller may not publish", body = ErrorResponse),
        (status = 404, description = "Certificate not found", body = ErrorResponse)
    )
)]
pub(crate) async fn publish_certificate(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Certificate>, ApiError> {
    let session = require_session(&state, &headers).await?;
    if !can_upload_certificate(session.identity.role) {
        return Err(api_forbidden("only administrators may publish certificates"));
    }
    let certificate = state
        .store
        .publish_certificate(&id)
        .await
        .map_err(|err| api_store_error("certificate", err))?;
    Ok(Json(certificate))
}

#[utoipa::path(
    post,
    path = "/v1/certificates/{id}/download",
    tag = "certificates",
    params(("id" = String, Path, description = "Certificate identifier")),
    responses(
        (
            status = 200,
            description = "File reference for the certificate",
            body = CertificateDownloadResponse
        ),
        (status = 404, description = "Certificate not found", body = ErrorResponse),
        (status = 409, description = "Certificate not yet available", body = ErrorResponse)
    )
)]
pub(crate) async fn download_certificate(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CertificateDownloadResponse>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let identity = &session.identity;
    let certificate = state
        .store
        .get_certificate(&id)
        .await
        .map_err(|err| api_store_error("certificate", err))?;
    if !can_download_certificate(identity, &certificate.intern_id) {
        return Err(api_not_found("certificate not found"));
    }

    let certificate = if identity.id == certificate.intern_id {
        state
            .store
            .record_certificate_download(&id, Utc::now())
            .await
            .map_err(|err| api_store_error("certificate", err))?
    } else if certificate.status == CertificateStatus::Pending {
        return Err(api_invalid_transition(
            "certificate is not available for download yet",
        ));
    } else {
        certificate
    };

    tracing::info!(
        certificate_id = %certificate.id,
        user_id = %identity.id,
        "certificate downloaded"
    );
    Ok(Json(CertificateDownloadResponse {
        file_name: certificate.file_name.clone(),
        file_url: certificate.file_url.clone(),
        certificate,
    }))
}
