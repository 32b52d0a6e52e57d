//! Session endpoints: login, two-step registration, logout, password reset.
//!
//! # Key invariants
//! - Login requires matching email, claimed role, and password; every failure
//!   returns the same `invalid_credentials` error.
//! - One-time codes are logged and, when echoing is enabled, returned in the
//!   response. Nothing is sent over a real channel.
//! - Password reset answers identically for known and unknown emails.
use crate::api::error::{
    ApiError, api_code_expired, api_conflict, api_internal, api_internal_message,
    api_invalid_code, api_invalid_credentials, api_not_found, api_validation_error,
};
use crate::api::types::{
    CodeIssuedResponse, LoginRequest, PasswordResetRequest, PasswordResetVerifyRequest,
    RegisterRequest, SessionResponse, VerifyCodeRequest,
};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::credentials::{MIN_PASSWORD_LEN, hash_password};
use crate::auth::otp::{CodeError, check_code, generate_code};
use crate::auth::session::require_session;
use crate::model::{ChallengePurpose, CodeChallenge, PendingRegistration, UserAccount};
use crate::observability;
use crate::store::StoreError;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use internhub_policy::Identity;

#[utoipa::path(
    post,
    path = "/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = normalize_email(&body.email);
    let account = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|err| api_internal("failed to look up account", &err))?;

    // Role and password are checked together so the response never reveals
    // which part was wrong.
    let Some(account) = account.filter(|account| {
        account.identity.role == body.role && account.password.verify(&body.password)
    }) else {
        metrics::counter!(observability::LOGINS_TOTAL, "outcome" => "rejected").increment(1);
        tracing::info!(role = %body.role, "login rejected");
        return Err(api_invalid_credentials());
    };

    metrics::counter!(observability::LOGINS_TOTAL, "outcome" => "success").increment(1);
    tracing::info!(user_id = %account.identity.id, role = %account.identity.role, "login");
    issue_session(&state, account.identity)
}

#[utoipa::path(
    post,
    path = "/v1/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 202, description = "Verification code issued", body = CodeIssuedResponse),
        (status = 400, description = "Invalid registration", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&body.email);
    if !looks_like_email(&email) {
        return Err(api_validation_error("a valid email is required"));
    }
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(api_validation_error("name is required"));
    }
    validate_password(&body.password)?;
    ensure_email_available(&state, &email).await?;

    let pending = PendingRegistration {
        email: email.clone(),
        name,
        role: body.role,
        department: body
            .department
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        password: hash_password(&body.password),
    };
    let issued = issue_code(&state, &email, ChallengePurpose::Registration(pending)).await?;
    Ok((StatusCode::ACCEPTED, Json(issued)))
}

#[utoipa::path(
    post,
    path = "/v1/register/verify",
    tag = "auth",
    request_body = VerifyCodeRequest,
    responses(
        (status = 201, description = "Account created and session issued", body = SessionResponse),
        (status = 400, description = "Wrong code", body = ErrorResponse),
        (status = 404, description = "Unknown challenge", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 410, description = "Code expired or attempts exhausted", body = ErrorResponse)
    )
)]
pub async fn register_verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let challenge = verify_challenge(&state, &body.challenge_id, &body.code).await?;
    let ChallengePurpose::Registration(pending) = challenge.purpose else {
        return Err(api_not_found("challenge not found"));
    };

    let mut identity = Identity::new(
        uuid::Uuid::new_v4().to_string(),
        pending.email,
        pending.name,
        pending.role,
    );
    identity.department = pending.department;
    let account = UserAccount {
        identity,
        password: pending.password,
    };
    let account = match state.store.create_user(account).await {
        Ok(account) => account,
        Err(StoreError::Conflict(_)) => {
            return Err(api_conflict("already_exists", "email already registered"));
        }
        Err(err) => return Err(api_internal("failed to create account", &err)),
    };
    metrics::counter!(observability::REGISTRATIONS_TOTAL).increment(1);
    tracing::info!(
        user_id = %account.identity.id,
        role = %account.identity.role,
        "account registered"
    );

    let session = issue_session(&state, account.identity)?;
    Ok((StatusCode::CREATED, session))
}

#[utoipa::path(
    post,
    path = "/v1/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = require_session(&state, &headers).await?;
    state
        .store
        .revoke_token(&session.claims.jti, session.claims.exp)
        .await
        .map_err(|err| api_internal("failed to revoke session", &err))?;
    tracing::info!(user_id = %session.identity.id, "logout");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ApiError> {
    let session = require_session(&state, &headers).await?;
    Ok(Json(session.identity))
}

#[utoipa::path(
    post,
    path = "/v1/password-reset",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses(
        (
            status = 202,
            description = "Reset challenge issued; identical for unknown emails",
            body = CodeIssuedResponse
        )
    )
)]
pub async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&body.email);
    if email.is_empty() {
        return Err(api_validation_error("email is required"));
    }
    let account = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|err| api_internal("failed to look up account", &err))?;

    let purpose = match account {
        Some(account) => ChallengePurpose::PasswordReset {
            user_id: account.identity.id,
        },
        None => {
            tracing::debug!("password reset requested for unknown email");
            ChallengePurpose::PasswordResetDecoy
        }
    };
    let issued = issue_code(&state, &email, purpose).await?;
    Ok((StatusCode::ACCEPTED, Json(issued)))
}

#[utoipa::path(
    post,
    path = "/v1/password-reset/verify",
    tag = "auth",
    request_body = PasswordResetVerifyRequest,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Wrong code or weak password", body = ErrorResponse),
        (status = 404, description = "Unknown challenge", body = ErrorResponse),
        (status = 410, description = "Code expired or attempts exhausted", body = ErrorResponse)
    )
)]
pub async fn password_reset_verify(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetVerifyRequest>,
) -> Result<StatusCode, ApiError> {
    validate_password(&body.new_password)?;
    let challenge = verify_challenge(&state, &body.challenge_id, &body.code).await?;
    let ChallengePurpose::PasswordReset { user_id } = challenge.purpose else {
        return Err(api_not_found("challenge not found"));
    };
    match state
        .store
        .update_password(&user_id, hash_password(&body.new_password))
        .await
    {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => return Err(api_not_found("challenge not found")),
        Err(err) => return Err(api_internal("failed to update password", &err)),
    }
    tracing::info!(%user_id, "password reset");
    Ok(StatusCode::NO_CONTENT)
}

fn issue_session(state: &AppState, identity: Identity) -> Result<Json<SessionResponse>, ApiError> {
    let issued = state
        .signer
        .mint(&identity, state.auth.session_ttl)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to mint session token");
            api_internal_message("failed to issue session")
        })?;
    Ok(Json(SessionResponse {
        token: issued.token,
        expires_at: issued.claims.exp,
        user: identity,
    }))
}

async fn issue_code(
    state: &AppState,
    email: &str,
    purpose: ChallengePurpose,
) -> Result<CodeIssuedResponse, ApiError> {
    let code = generate_code();
    let expires_at = Utc::now() + state.auth.code_ttl;
    let purpose_name = purpose.as_str();
    let challenge = CodeChallenge::new(email, purpose, code.clone(), expires_at);
    let challenge_id = challenge.id.clone();
    state
        .store
        .put_challenge(challenge)
        .await
        .map_err(|err| api_internal("failed to store verification code", &err))?;

    // No delivery channel exists; the log line is how operators read the code.
    tracing::info!(
        %email,
        purpose = purpose_name,
        %challenge_id,
        %code,
        "verification code issued"
    );
    Ok(CodeIssuedResponse {
        challenge_id,
        expires_at,
        code: state.auth.echo_codes.then_some(code),
    })
}

/// Check a submitted code and consume the challenge on success.
async fn verify_challenge(
    state: &AppState,
    challenge_id: &str,
    code: &str,
) -> Result<CodeChallenge, ApiError> {
    let mut challenge = match state.store.get_challenge(challenge_id).await {
        Ok(challenge) => challenge,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("challenge not found")),
        Err(err) => return Err(api_internal("failed to load challenge", &err)),
    };

    match check_code(
        &mut challenge,
        code,
        Utc::now(),
        state.auth.max_code_attempts,
    ) {
        Ok(()) => {
            state
                .store
                .remove_challenge(challenge_id)
                .await
                .map_err(|err| api_internal("failed to consume challenge", &err))?;
            Ok(challenge)
        }
        Err(err @ CodeError::Invalid { .. }) => {
            state
                .store
                .record_challenge_attempt(challenge_id, challenge.attempts)
                .await
                .map_err(|store_err| api_internal("failed to record attempt", &store_err))?;
            Err(api_invalid_code(&err.to_string()))
        }
        Err(err) => {
            debug_assert!(err.is_terminal());
            state
                .store
                .remove_challenge(challenge_id)
                .await
                .map_err(|store_err| api_internal("failed to discard challenge", &store_err))?;
            Err(api_code_expired(&err.to_string()))
        }
    }
}

async fn ensure_email_available(state: &AppState, email: &str) -> Result<(), ApiError> {
    let existing = state
        .store
        .find_user_by_email(email)
        .await
        .map_err(|err| api_internal("failed to look up account", &err))?;
    if existing.is_some() {
        return Err(api_conflict("already_exists", "email already registered"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(api_validation_error(&format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_and_shape() {
        assert_eq!(normalize_email("  Intern@Renu.org "), "intern@renu.org");
        assert!(looks_like_email("new@renu.org"));
        assert!(!looks_like_email("new@renu"));
        assert!(!looks_like_email("@renu.org"));
        assert!(!looks_like_email("renu.org"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
