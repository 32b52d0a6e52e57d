use crate::auth::credentials::PasswordDigest;
use chrono::{DateTime, Utc};
use internhub_policy::Role;

/// Account details held back until the registration code is confirmed.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
    pub password: PasswordDigest,
}

#[derive(Debug, Clone)]
pub enum ChallengePurpose {
    Registration(PendingRegistration),
    PasswordReset { user_id: String },
    /// Reset requested for an email with no account. Tracked like a real
    /// reset so the responses match, but no code ever satisfies it.
    PasswordResetDecoy,
}

impl ChallengePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengePurpose::Registration(_) => "registration",
            ChallengePurpose::PasswordReset { .. } | ChallengePurpose::PasswordResetDecoy => {
                "password_reset"
            }
        }
    }

    pub fn accepts_codes(&self) -> bool {
        !matches!(self, ChallengePurpose::PasswordResetDecoy)
    }
}

/// Outstanding one-time code. Removed from the store once consumed, expired or
/// out of attempts.
#[derive(Debug, Clone)]
pub struct CodeChallenge {
    pub id: String,
    pub email: String,
    pub purpose: ChallengePurpose,
    pub code: String,
    pub attempts: u32,
    pub expires_at: DateTime<Utc>,
}

impl CodeChallenge {
    pub fn new(
        email: impl Into<String>,
        purpose: ChallengePurpose,
        code: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            purpose,
            code,
            attempts: 0,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
