//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every endpoint returns the
//! same `{code, message, request_id}` shape. `request_id` is filled from the
//! id of the request being handled.
//!
//! # Key invariants and assumptions
//! - `code` values are stable; clients branch on them.
//! - Records the caller may not see are reported as `not_found`, never
//!   `forbidden`, so their existence does not leak.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::request_id::current_request_id;
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use internhub_policy::PolicyError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                request_id: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(mut self) -> axum::response::Response {
        if self.body.request_id.is_none() {
            self.body.request_id = current_request_id();
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        if err.is_invalid_input() {
            api_validation_error(&err.to_string())
        } else {
            api_forbidden(&err.to_string())
        }
    }
}

pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn api_conflict(code: &str, message: &str) -> ApiError {
    // Caller provides a specific conflict code for precise client handling.
    ApiError::new(StatusCode::CONFLICT, code, message)
}

pub fn api_invalid_transition(message: &str) -> ApiError {
    api_conflict("invalid_transition", message)
}

pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "portal storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

pub fn api_internal_message(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

pub fn api_invalid_credentials() -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email, password, or role",
    )
}

pub fn api_forbidden(message: &str) -> ApiError {
    ApiError::new(StatusCode::FORBIDDEN, "forbidden", message)
}

pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn api_invalid_code(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_code", message)
}

pub fn api_code_expired(message: &str) -> ApiError {
    ApiError::new(StatusCode::GONE, "code_expired", message)
}

/// Map a store failure on a single record. `what` names the record kind.
pub fn api_store_error(what: &str, err: StoreError) -> ApiError {
    match &err {
        StoreError::NotFound(_) => api_not_found(&format!("{what} not found")),
        StoreError::Conflict(_) => {
            api_conflict("already_exists", &format!("{what} already exists"))
        }
        StoreError::InvalidTransition(reason) => api_invalid_transition(reason),
        StoreError::Unexpected(_) => api_internal(&format!("failed to update {what}"), &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let cases = [
            (api_not_found("missing"), StatusCode::NOT_FOUND, "not_found"),
            (
                api_conflict("already_exists", "dup"),
                StatusCode::CONFLICT,
                "already_exists",
            ),
            (
                api_invalid_transition("pending"),
                StatusCode::CONFLICT,
                "invalid_transition",
            ),
            (
                api_internal_message("oops"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
            (api_unauthorized("nope"), StatusCode::UNAUTHORIZED, "unauthorized"),
            (
                api_invalid_credentials(),
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
            ),
            (api_forbidden("nope"), StatusCode::FORBIDDEN, "forbidden"),
            (
                api_validation_error("bad"),
                StatusCode::BAD_REQUEST,
                "validation_error",
            ),
            (api_invalid_code("bad"), StatusCode::BAD_REQUEST, "invalid_code"),
            (api_code_expired("late"), StatusCode::GONE, "code_expired"),
        ];
        for (error, status, code) in cases {
            assert_eq!(error.status, status);
            assert_eq!(error.body.code, code);
            assert!(error.body.request_id.is_none());
        }
    }

    #[test]
    fn policy_errors_split_into_validation_and_forbidden() {
        let missing: ApiError = PolicyError::MissingDepartment.into();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        let foreign: ApiError = PolicyError::ForeignDepartment.into();
        assert_eq!(foreign.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_errors_map_by_kind() {
        let not_found = api_store_error("meeting", StoreError::NotFound("meeting".into()));
        assert_eq!(not_found.body.message, "meeting not found");
        let transition = api_store_error(
            "certificate",
            StoreError::InvalidTransition("not available".into()),
        );
        assert_eq!(transition.body.code, "invalid_transition");
        let internal = api_store_error(
            "certificate",
            StoreError::Unexpected(anyhow::anyhow!("boom")),
        );
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
