//! Six-digit one-time codes for registration and password reset.
//!
//! Codes are never delivered over a real channel; the issuing handler logs
//! them and optionally echoes them back for development setups.
use crate::model::CodeChallenge;
use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("verification code is incorrect ({remaining} attempts left)")]
    Invalid { remaining: u32 },
    #[error("verification code has expired")]
    Expired,
    #[error("too many incorrect attempts")]
    Exhausted,
}

impl CodeError {
    /// Whether the challenge must be discarded after this error.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CodeError::Invalid { .. })
    }
}

pub fn generate_code() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Check `submitted` against the challenge, counting failed attempts.
///
/// Decoy challenges never match. A wrong code keeps the challenge alive until
/// `max_attempts` failures have accumulated or the challenge expires.
pub fn check_code(
    challenge: &mut CodeChallenge,
    submitted: &str,
    now: DateTime<Utc>,
    max_attempts: u32,
) -> Result<(), CodeError> {
    if challenge.is_expired(now) {
        return Err(CodeError::Expired);
    }
    if challenge.attempts >= max_attempts {
        return Err(CodeError::Exhausted);
    }
    let matches = constant_time_eq(challenge.code.as_bytes(), submitted.trim().as_bytes());
    if matches && challenge.purpose.accepts_codes() {
        return Ok(());
    }
    challenge.attempts += 1;
    if challenge.attempts >= max_attempts {
        return Err(CodeError::Exhausted);
    }
    Err(CodeError::Invalid {
        remaining: max_attempts - challenge.attempts,
    })
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
