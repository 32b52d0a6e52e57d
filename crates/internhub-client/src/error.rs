//! Typed client errors.
//!
//! # Key invariants
//! - Every non-2xx response maps to exactly one variant by status code.
//! - The portal's `{code, message}` body is carried through when it parses;
//!   otherwise the raw body text becomes the message.
use crate::storage::StorageError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Error body returned by every portal endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("unauthorized ({code}): {message}")]
    Unauthorized { code: String, message: String },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed ({code}): {message}")]
    Validation { code: String, message: String },
    #[error("conflict ({code}): {message}")]
    Conflict { code: String, message: String },
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("session storage: {0}")]
    Storage(#[from] StorageError),
    #[error("client config: {0}")]
    Config(String),
}

impl ClientError {
    /// Build the error for a failed response from its status and body text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => (parsed.code, parsed.message),
            Err(_) => (
                status
                    .canonical_reason()
                    .unwrap_or("error")
                    .to_ascii_lowercase()
                    .replace(' ', "_"),
                body.trim().to_string(),
            ),
        };
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { code, message },
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::GONE | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation { code, message }
            }
            StatusCode::CONFLICT => Self::Conflict { code, message },
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Server-side error code, when the portal supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { code, .. }
            | Self::Validation { code, .. }
            | Self::Conflict { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        let body = r#"{"code":"invalid_credentials","message":"bad login","request_id":null}"#;
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, body);
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some("invalid_credentials"));

        let err = ClientError::from_response(
            StatusCode::GONE,
            r#"{"code":"code_expired","message":"expired"}"#,
        );
        assert!(matches!(err, ClientError::Validation { ref code, .. } if code == "code_expired"));

        let err = ClientError::from_response(
            StatusCode::CONFLICT,
            r#"{"code":"already_exists","message":"email taken"}"#,
        );
        assert_eq!(err.code(), Some("already_exists"));

        let err = ClientError::from_response(
            StatusCode::FORBIDDEN,
            r#"{"code":"forbidden","message":"no"}"#,
        );
        assert!(matches!(err, ClientError::Forbidden(ref message) if message == "no"));
    }

    #[test]
    fn unparseable_body_keeps_raw_text() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
        let err = ClientError::from_response(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
