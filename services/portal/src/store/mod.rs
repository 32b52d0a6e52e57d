//! Storage abstraction for portal state.
//!
//! # Purpose
//! Every collection the HTTP layer reads or mutates goes through
//! [`PortalStore`]. Handlers apply the visibility policy on top of what the
//! store returns; the store itself is policy-agnostic.
//!
//! # Key invariants
//! - Lifecycle transitions (certificate status, meeting attendance) happen
//!   under the owning collection's write lock so concurrent requests cannot
//!   interleave a read-check-write.
//! - List methods return records in display order: announcements and
//!   certificates newest first, messages oldest first, meetings by start time.
use crate::auth::credentials::PasswordDigest;
use crate::model::{
    Announcement, Certificate, ChatMessage, CodeChallenge, Meeting, UserAccount,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use internhub_policy::Identity;
use thiserror::Error;

pub mod memory;
pub mod seed;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PortalStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<UserAccount>>;
    async fn get_user(&self, user_id: &str) -> StoreResult<UserAccount>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;
    async fn create_user(&self, account: UserAccount) -> StoreResult<UserAccount>;
    async fn update_password(&self, user_id: &str, password: PasswordDigest) -> StoreResult<()>;

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>>;
    async fn get_announcement(&self, id: &str) -> StoreResult<Announcement>;
    async fn create_announcement(&self, announcement: Announcement) -> StoreResult<Announcement>;
    async fn mark_announcement_read(&self, id: &str, user_id: &str)
    -> StoreResult<Announcement>;

    async fn list_certificates(&self) -> StoreResult<Vec<Certificate>>;
    async fn get_certificate(&self, id: &str) -> StoreResult<Certificate>;
    async fn create_certificate(&self, certificate: Certificate) -> StoreResult<Certificate>;
    async fn publish_certificate(&self, id: &str) -> StoreResult<Certificate>;
    async fn record_certificate_download(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Certificate>;

    async fn list_messages_for(&self, user_id: &str) -> StoreResult<Vec<ChatMessage>>;
    async fn create_message(&self, message: ChatMessage) -> StoreResult<ChatMessage>;
    /// Mark every message from `contact_id` to `reader_id` as read; returns how
    /// many changed.
    async fn mark_messages_read(&self, reader_id: &str, contact_id: &str) -> StoreResult<usize>;

    async fn list_meetings(&self) -> StoreResult<Vec<Meeting>>;
    async fn get_meeting(&self, id: &str) -> StoreResult<Meeting>;
    async fn create_meeting(&self, meeting: Meeting) -> StoreResult<Meeting>;
    async fn cancel_meeting(&self, id: &str, now: DateTime<Utc>) -> StoreResult<Meeting>;
    async fn join_meeting(
        &self,
        id: &str,
        user: &Identity,
        now: DateTime<Utc>,
    ) -> StoreResult<Meeting>;
    async fn leave_meeting(
        &self,
        id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Meeting>;

    /// Store a challenge, replacing any earlier one for the same email and
    /// purpose.
    async fn put_challenge(&self, challenge: CodeChallenge) -> StoreResult<()>;
    async fn get_challenge(&self, id: &str) -> StoreResult<CodeChallenge>;
    async fn record_challenge_attempt(&self, id: &str, attempts: u32) -> StoreResult<()>;
    async fn remove_challenge(&self, id: &str) -> StoreResult<()>;

    async fn revoke_token(&self, jti: &str, expires_at: i64) -> StoreResult<()>;
    async fn is_token_revoked(&self, jti: &str) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
