//! Announcement records and board filters.
use chrono::{DateTime, Utc};
use internhub_policy::{Audience, AudienceScope, Identity, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn is_high(self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<&Identity> for AuthorSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            role: identity.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: AuthorSummary,
    pub target_audience: Audience,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub priority: Priority,
    pub pinned: bool,
    pub read_by: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Build a new announcement from an already validated audience scope.
    pub fn new(
        author: &Identity,
        title: String,
        content: String,
        scope: AudienceScope,
        priority: Priority,
        pinned: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            author: AuthorSummary::from(author),
            target_audience: scope.audience(),
            department: scope.department().map(str::to_string),
            priority,
            pinned,
            read_by: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|id| id == user_id)
    }

    /// Record a reader; returns false when the reader was already recorded.
    pub fn mark_read(&mut self, user_id: &str) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        true
    }

    pub fn matches_filter(&self, filter: AnnouncementFilter, viewer: &Identity) -> bool {
        match filter {
            AnnouncementFilter::All => true,
            AnnouncementFilter::Unread => !self.is_read_by(&viewer.id),
            AnnouncementFilter::Pinned => self.pinned,
            AnnouncementFilter::Department => {
                self.target_audience == Audience::SpecificDepartment
                    || viewer.in_department(self.department.as_deref())
            }
            AnnouncementFilter::HighPriority => self.priority.is_high(),
        }
    }

    /// Case-insensitive search across title, content and author name.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.author.name.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementFilter {
    #[default]
    All,
    Unread,
    Pinned,
    Department,
    HighPriority,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(scope: AudienceScope, priority: Priority, pinned: bool) -> Announcement {
        let author = Identity::new("1", "ceo@renu.org", "Renu Sharma", Role::Owner);
        Announcement::new(
            &author,
            "Weekly Report Reminder".to_string(),
            "Submit your weekly progress report by Friday.".to_string(),
            scope,
            priority,
            pinned,
            Utc::now(),
        )
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut announcement = sample(AudienceScope::Everyone, Priority::Low, false);
        assert!(announcement.mark_read("4"));
        assert!(!announcement.mark_read("4"));
        assert_eq!(announcement.read_by, vec!["4".to_string()]);
    }

    #[test]
    fn filters_apply_to_viewer() {
        let viewer = Identity::new("4", "intern@renu.org", "John Intern", Role::Participant)
            .with_department("Engineering");
        let mut urgent = sample(AudienceScope::Everyone, Priority::Urgent, true);
        let department = sample(
            AudienceScope::Department("Engineering".to_string()),
            Priority::Medium,
            false,
        );

        assert!(urgent.matches_filter(AnnouncementFilter::HighPriority, &viewer));
        assert!(!department.matches_filter(AnnouncementFilter::HighPriority, &viewer));
        assert!(urgent.matches_filter(AnnouncementFilter::Pinned, &viewer));
        assert!(department.matches_filter(AnnouncementFilter::Department, &viewer));
        assert!(!urgent.matches_filter(AnnouncementFilter::Department, &viewer));

        assert!(urgent.matches_filter(AnnouncementFilter::Unread, &viewer));
        urgent.mark_read("4");
        assert!(!urgent.matches_filter(AnnouncementFilter::Unread, &viewer));
    }

    #[test]
    fn query_matches_author_and_body() {
        let announcement = sample(AudienceScope::Everyone, Priority::Low, false);
        assert!(announcement.matches_query("renu"));
        assert!(announcement.matches_query("FRIDAY"));
        assert!(announcement.matches_query("  "));
        assert!(!announcement.matches_query("maintenance"));
    }

    #[test]
    fn department_only_kept_for_department_scope() {
        let announcement = sample(
            AudienceScope::Department("Design".to_string()),
            Priority::Low,
            false,
        );
        assert_eq!(announcement.target_audience, Audience::SpecificDepartment);
        assert_eq!(announcement.department.as_deref(), Some("Design"));
    }
}
