// Request and response bodies shared with the portal's JSON API.
use chrono::{DateTime, Utc};
use internhub_policy::{Identity, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Bearer token plus the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionGrant {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// A one-time code was issued. `code` is only present when the portal runs
/// with code echo enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeIssued {
    pub challenge_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCode {
    pub challenge_id: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub challenge_id: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavEntry {
    pub id: String,
    pub label: String,
}

/// `{items: [...]}` list envelope. Extra fields such as `unread_count` are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}
