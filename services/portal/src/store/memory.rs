//! In-memory implementation of the portal store.
//!
//! # Purpose
//! Implements [`PortalStore`] with collections guarded by
//! `tokio::sync::RwLock`. It backs local development, tests, and demo
//! deployments.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart, including revoked
//!   token ids.
//! - **Single-process consistency**: reads take read locks and may run
//!   concurrently; mutations take the write lock of the collection they touch.
//!
//! # Metrics
//! Collection sizes are exported as gauges so dashboards look the same
//! regardless of how the store was populated.
use super::seed::SeedData;
use super::{PortalStore, StoreError, StoreResult};
use crate::auth::credentials::PasswordDigest;
use crate::observability;
use crate::model::{
    Announcement, Certificate, ChatMessage, CodeChallenge, Meeting, UserAccount,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use internhub_policy::Identity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, UserAccount>>>,
    // Newest first.
    announcements: Arc<RwLock<Vec<Announcement>>>,
    // Newest upload first.
    certificates: Arc<RwLock<Vec<Certificate>>>,
    // Oldest first.
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    meetings: Arc<RwLock<HashMap<String, Meeting>>>,
    challenges: Arc<RwLock<HashMap<String, CodeChallenge>>>,
    // jti -> expiry (epoch seconds)
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `data`.
    pub fn seeded(data: SeedData) -> Self {
        let SeedData {
            users,
            mut announcements,
            mut certificates,
            mut messages,
            meetings,
        } = data;
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        certificates.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        messages.sort_by_key(|message| message.timestamp);

        metrics::gauge!(observability::USERS_TOTAL).set(users.len() as f64);
        metrics::gauge!(observability::ANNOUNCEMENTS_TOTAL).set(announcements.len() as f64);
        metrics::gauge!(observability::CERTIFICATES_TOTAL).set(certificates.len() as f64);
        metrics::gauge!(observability::MEETINGS_TOTAL).set(meetings.len() as f64);

        Self {
            users: Arc::new(RwLock::new(
                users
                    .into_iter()
                    .map(|account| (account.id().to_string(), account))
                    .collect(),
            )),
            announcements: Arc::new(RwLock::new(announcements)),
            certificates: Arc::new(RwLock::new(certificates)),
            messages: Arc::new(RwLock::new(messages)),
            meetings: Arc::new(RwLock::new(
                meetings
                    .into_iter()
                    .map(|meeting| (meeting.id.clone(), meeting))
                    .collect(),
            )),
            challenges: Arc::new(RwLock::new(HashMap::new())),
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn transition(err: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidTransition(err.to_string())
}

#[async_trait]
impl PortalStore for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        let mut users: Vec<UserAccount> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.identity.name.cmp(&b.identity.name));
        Ok(users)
    }

    async fn get_user(&self, user_id: &str) -> StoreResult<UserAccount> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".into()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|account| account.email().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, account: UserAccount) -> StoreResult<UserAccount> {
        let mut users = self.users.write().await;
        // Email is the login key, so it must be unique as well as the id.
        if users.contains_key(account.id())
            || users
                .values()
                .any(|existing| existing.email().eq_ignore_ascii_case(account.email()))
        {
            return Err(StoreError::Conflict("user exists".into()));
        }
        users.insert(account.id().to_string(), account.clone());
        metrics::gauge!(observability::USERS_TOTAL).set(users.len() as f64);
        Ok(account)
    }

    async fn update_password(&self, user_id: &str, password: PasswordDigest) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let account = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound("user".into()))?;
        account.password = password;
        Ok(())
    }

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        Ok(self.announcements.read().await.clone())
    }

    async fn get_announcement(&self, id: &str) -> StoreResult<Announcement> {
        self.announcements
            .read()
            .await
            .iter()
            .find(|announcement| announcement.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("announcement".into()))
    }

    async fn create_announcement(&self, announcement: Announcement) -> StoreResult<Announcement> {
        let mut announcements = self.announcements.write().await;
        if announcements.iter().any(|existing| existing.id == announcement.id) {
            return Err(StoreError::Conflict("announcement exists".into()));
        }
        announcements.insert(0, announcement.clone());
        metrics::counter!(observability::ANNOUNCEMENTS_CREATED_TOTAL).increment(1);
        metrics::gauge!(observability::ANNOUNCEMENTS_TOTAL).set(announcements.len() as f64);
        Ok(announcement)
    }

    async fn mark_announcement_read(
        &self,
        id: &str,
        user_id: &str,
    ) -> StoreResult<Announcement> {
        let mut announcements = self.announcements.write().await;
        let announcement = announcements
            .iter_mut()
            .find(|announcement| announcement.id == id)
            .ok_or_else(|| StoreError::NotFound("announcement".into()))?;
        announcement.mark_read(user_id);
        Ok(announcement.clone())
    }

    async fn list_certificates(&self) -> StoreResult<Vec<Certificate>> {
        Ok(self.certificates.read().await.clone())
    }

    async fn get_certificate(&self, id: &str) -> StoreResult<Certificate> {
        self.certificates
            .read()
            .await
            .iter()
            .find(|certificate| certificate.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("certificate".into()))
    }

    async fn create_certificate(&self, certificate: Certificate) -> StoreResult<Certificate> {
        let mut certificates = self.certificates.write().await;
        if certificates.iter().any(|existing| existing.id == certificate.id) {
            return Err(StoreError::Conflict("certificate exists".into()));
        }
        certificates.insert(0, certificate.clone());
        metrics::counter!(observability::CERTIFICATES_UPLOADED_TOTAL).increment(1);
        metrics::gauge!(observability::CERTIFICATES_TOTAL).set(certificates.len() as f64);
        Ok(certificate)
    }

    async fn publish_certificate(&self, id: &str) -> StoreResult<Certificate> {
        let mut certificates = self.certificates.write().await;
        let certificate = certificates
            .iter_mut()
            .find(|certificate| certificate.id == id)
            .ok_or_else(|| StoreError::NotFound("certificate".into()))?;
        certificate.publish();
        Ok(certificate.clone())
    }

    async fn record_certificate_download(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Certificate> {
        let mut certificates = self.certificates.write().await;
        let certificate = certificates
            .iter_mut()
            .find(|certificate| certificate.id == id)
            .ok_or_else(|| StoreError::NotFound("certificate".into()))?;
        certificate.record_download(at).map_err(transition)?;
        metrics::counter!(observability::CERTIFICATE_DOWNLOADS_TOTAL).increment(1);
        Ok(certificate.clone())
    }

    async fn list_messages_for(&self, user_id: &str) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|message| message.involves(user_id))
            .cloned()
            .collect())
    }

    async fn create_message(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        let mut messages = self.messages.write().await;
        // Keep timestamp order even if a caller supplies an older timestamp.
        let position = messages.partition_point(|existing| existing.timestamp <= message.timestamp);
        messages.insert(position, message.clone());
        metrics::counter!(observability::MESSAGES_SENT_TOTAL).increment(1);
        Ok(message)
    }

    async fn mark_messages_read(&self, reader_id: &str, contact_id: &str) -> StoreResult<usize> {
        let mut messages = self.messages.write().await;
        let mut changed = 0;
        for message in messages.iter_mut().filter(|message| {
            message.receiver_id == reader_id && message.sender_id == contact_id && !message.read
        }) {
            message.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_meetings(&self) -> StoreResult<Vec<Meeting>> {
        let mut meetings: Vec<Meeting> = self.meetings.read().await.values().cloned().collect();
        meetings.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(meetings)
    }

    async fn get_meeting(&self, id: &str) -> StoreResult<Meeting> {
        self.meetings
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("meeting".into()))
    }

    async fn create_meeting(&self, meeting: Meeting) -> StoreResult<Meeting> {
        let mut meetings = self.meetings.write().await;
        if meetings.contains_key(&meeting.id) {
            return Err(StoreError::Conflict("meeting exists".into()));
        }
        meetings.insert(meeting.id.clone(), meeting.clone());
        metrics::gauge!(observability::MEETINGS_TOTAL).set(meetings.len() as f64);
        Ok(meeting)
    }

    async fn cancel_meeting(&self, id: &str, now: DateTime<Utc>) -> StoreResult<Meeting> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound("meeting".into()))?;
        meeting.cancel(now).map_err(transition)?;
        Ok(meeting.clone())
    }

    async fn join_meeting(
        &self,
        id: &str,
        user: &Identity,
        now: DateTime<Utc>,
    ) -> StoreResult<Meeting> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound("meeting".into()))?;
        meeting.join(user, now).map_err(transition)?;
        Ok(meeting.clone())
    }

    async fn leave_meeting(
        &self,
        id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Meeting> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound("meeting".into()))?;
        meeting.leave(user_id, now).map_err(transition)?;
        Ok(meeting.clone())
    }

    async fn put_challenge(&self, challenge: CodeChallenge) -> StoreResult<()> {
        let mut challenges = self.challenges.write().await;
        let purpose = challenge.purpose.as_str();
        challenges.retain(|_, existing| {
            !(existing.email.eq_ignore_ascii_case(&challenge.email)
                && existing.purpose.as_str() == purpose)
        });
        challenges.insert(challenge.id.clone(), challenge);
        Ok(())
    }

    async fn get_challenge(&self, id: &str) -> StoreResult<CodeChallenge> {
        self.challenges
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("challenge".into()))
    }

    async fn record_challenge_attempt(&self, id: &str, attempts: u32) -> StoreResult<()> {
        let mut challenges = self.challenges.write().await;
        let challenge = challenges
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound("challenge".into()))?;
        challenge.attempts = challenge.attempts.max(attempts);
        Ok(())
    }

    async fn remove_challenge(&self, id: &str) -> StoreResult<()> {
        self.challenges.write().await.remove(id);
        Ok(())
    }

    async fn revoke_token(&self, jti: &str, expires_at: i64) -> StoreResult<()> {
        let mut revoked = self.revoked_tokens.write().await;
        // Entries past their expiry would be rejected anyway; drop them.
        let now = Utc::now().timestamp();
        revoked.retain(|_, expiry| *expiry > now);
        revoked.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> StoreResult<bool> {
        Ok(self.revoked_tokens.read().await.contains_key(jti))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CertificateStatus, ChallengePurpose};
    use crate::store::seed::demo_data;
    use chrono::Duration;

    fn store() -> InMemoryStore {
        InMemoryStore::seeded(demo_data(Utc::now()))
    }

    #[tokio::test]
    async fn seeded_lists_are_in_display_order() {
        let store = store();
        let announcements = store.list_announcements().await.expect("announcements");
        assert!(
            announcements
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
        let certificates = store.list_certificates().await.expect("certificates");
        assert!(
            certificates
                .windows(2)
                .all(|pair| pair[0].uploaded_at >= pair[1].uploaded_at)
        );
        let messages = store.list_messages_for("4").await.expect("messages");
        assert!(
            messages
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp)
        );
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = store();
        let existing = store
            .find_user_by_email("INTERN@renu.org")
            .await
            .expect("lookup")
            .expect("seeded intern");
        let mut copy = existing.clone();
        copy.identity.id = "99".to_string();
        let err = store.create_user(copy).await.expect_err("conflict");
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn new_announcement_goes_first() {
        let store = store();
        let author = store.get_user("1").await.expect("owner").identity;
        let announcement = Announcement::new(
            &author,
            "Holiday".to_string(),
            "Office closed".to_string(),
            internhub_policy::AudienceScope::Everyone,
            crate::model::Priority::Low,
            false,
            Utc::now() - Duration::days(30),
        );
        let created = store
            .create_announcement(announcement)
            .await
            .expect("create");
        let listed = store.list_announcements().await.expect("list");
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn certificate_download_requires_available() {
        let store = store();
        let pending = Certificate {
            id: "pending".to_string(),
            intern_id: "4".to_string(),
            intern_name: "John Intern".to_string(),
            intern_email: "intern@renu.org".to_string(),
            department: Some("Engineering".to_string()),
            kind: crate::model::CertificateKind::CompletionCertificate,
            file_name: "draft.pdf".to_string(),
            file_url: "/files/draft.pdf".to_string(),
            uploaded_by: "System Admin".to_string(),
            status: CertificateStatus::Pending,
            uploaded_at: Utc::now(),
            downloaded_at: None,
        };
        store.create_certificate(pending).await.expect("create");
        let err = store
            .record_certificate_download("pending", Utc::now())
            .await
            .expect_err("not available");
        assert!(matches!(err, StoreError::InvalidTransition(_)));

        store.publish_certificate("pending").await.expect("publish");
        let downloaded = store
            .record_certificate_download("pending", Utc::now())
            .await
            .expect("download");
        assert_eq!(downloaded.status, CertificateStatus::Downloaded);
    }

    #[tokio::test]
    async fn mark_messages_read_only_touches_one_direction() {
        let store = store();
        let changed = store.mark_messages_read("4", "2").await.expect("mark");
        assert_eq!(changed, 1);
        let again = store.mark_messages_read("4", "2").await.expect("mark");
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn newer_challenge_replaces_older_for_same_email() {
        let store = store();
        let expires = Utc::now() + Duration::minutes(10);
        let purpose = || ChallengePurpose::PasswordReset {
            user_id: "4".to_string(),
        };
        let first = CodeChallenge::new("intern@renu.org", purpose(), "111111".into(), expires);
        let second = CodeChallenge::new("intern@renu.org", purpose(), "222222".into(), expires);
        let first_id = first.id.clone();
        let second_id = second.id.clone();
        store.put_challenge(first).await.expect("first");
        store.put_challenge(second).await.expect("second");
        assert!(store.get_challenge(&first_id).await.is_err());
        assert_eq!(
            store.get_challenge(&second_id).await.expect("second").code,
            "222222"
        );
    }

    #[tokio::test]
    async fn revoked_tokens_are_remembered() {
        let store = store();
        let exp = Utc::now().timestamp() + 600;
        store.revoke_token("jti-1", exp).await.expect("revoke");
        assert!(store.is_token_revoked("jti-1").await.expect("check"));
        assert!(!store.is_token_revoked("jti-2").await.expect("check"));
    }
}
