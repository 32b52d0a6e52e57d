//! Direct chat messages and per-contact conversation summaries.
use chrono::{DateTime, Utc};
use internhub_policy::{Identity, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_role: Role,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl ChatMessage {
    pub fn new(sender: &Identity, receiver_id: &str, content: String, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            sender_role: sender.role,
            receiver_id: receiver_id.to_string(),
            content,
            timestamp: at,
            read: false,
        }
    }

    /// True when the message was exchanged between `a` and `b` in either
    /// direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other side of the exchange, seen from `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.sender_id == user_id {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Conversation {
    pub contact: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<ChatMessage>,
    pub unread_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Summarize the thread between `viewer_id` and `contact`.
    pub fn summarize(viewer_id: &str, contact: Identity, messages: &[ChatMessage]) -> Self {
        let thread: Vec<&ChatMessage> = messages
            .iter()
            .filter(|message| message.is_between(viewer_id, &contact.id))
            .collect();
        let unread_count = thread
            .iter()
            .filter(|message| message.receiver_id == viewer_id && !message.read)
            .count();
        let last_message = thread
            .iter()
            .max_by_key(|message| message.timestamp)
            .map(|message| (*message).clone());
        Self {
            updated_at: last_message.as_ref().map(|message| message.timestamp),
            contact,
            last_message,
            unread_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn head() -> Identity {
        Identity::new("3", "hod@renu.org", "Department Head", Role::DepartmentHead)
            .with_department("Engineering")
    }

    fn intern() -> Identity {
        Identity::new("4", "intern@renu.org", "John Intern", Role::Participant)
            .with_department("Engineering")
    }

    #[test]
    fn summary_counts_unread_for_viewer_only() {
        let start = Utc::now();
        let mut first = ChatMessage::new(&head(), "4", "Hi John".to_string(), start);
        first.read = true;
        let second = ChatMessage::new(
            &intern(),
            "3",
            "Hello!".to_string(),
            start + Duration::minutes(1),
        );
        let third = ChatMessage::new(
            &head(),
            "4",
            "Good morning".to_string(),
            start + Duration::minutes(2),
        );
        let unrelated = ChatMessage::new(&head(), "9", "Elsewhere".to_string(), start);
        let messages = vec![first, second, third, unrelated];

        let summary = Conversation::summarize("4", head(), &messages);
        assert_eq!(summary.unread_count, 1);
        assert_eq!(
            summary.last_message.as_ref().map(|m| m.content.as_str()),
            Some("Good morning")
        );
        assert_eq!(summary.updated_at, Some(start + Duration::minutes(2)));

        let summary = Conversation::summarize("3", intern(), &messages);
        assert_eq!(summary.unread_count, 1);
    }

    #[test]
    fn empty_thread_has_no_last_message() {
        let summary = Conversation::summarize("4", head(), &[]);
        assert!(summary.last_message.is_none());
        assert_eq!(summary.unread_count, 0);
    }

    #[test]
    fn counterpart_is_the_other_side() {
        let message = ChatMessage::new(&head(), "4", "Hi".to_string(), Utc::now());
        assert_eq!(message.counterpart("3"), "4");
        assert_eq!(message.counterpart("4"), "3");
        assert!(message.involves("4"));
        assert!(!message.involves("2"));
    }
}
