//! Demo organization used for local runs and tests.
//!
//! All seeded accounts share [`DEMO_PASSWORD`]. Timestamps are relative to the
//! instant passed in so the board, chat, and calendar always look recent.
use crate::auth::credentials::{DEMO_PASSWORD, hash_password};
use crate::model::{
    Announcement, AuthorSummary, Certificate, CertificateKind, CertificateStatus, ChatMessage,
    Meeting, MeetingStatus, OrganizerSummary, Priority, UserAccount,
};
use chrono::{DateTime, Duration, Utc};
use internhub_policy::{Audience, Identity, Role};

pub const DEPARTMENTS: [&str; 6] = [
    "Engineering",
    "Marketing",
    "Design",
    "Operations",
    "Finance",
    "HR",
];

#[derive(Debug, Default)]
pub struct SeedData {
    pub users: Vec<UserAccount>,
    pub announcements: Vec<Announcement>,
    pub certificates: Vec<Certificate>,
    pub messages: Vec<ChatMessage>,
    pub meetings: Vec<Meeting>,
}

pub fn demo_identities() -> Vec<Identity> {
    vec![
        Identity::new("1", "ceo@renu.org", "Renu Sharma", Role::Owner),
        Identity::new("2", "coo@renu.org", "Operations Head", Role::OperationsLead),
        Identity::new("3", "hod@renu.org", "Department Head", Role::DepartmentHead)
            .with_department("Engineering"),
        Identity::new("4", "intern@renu.org", "John Intern", Role::Participant)
            .with_department("Engineering"),
        Identity::new("5", "admin@renu.org", "System Admin", Role::SystemAdmin),
        Identity::new("6", "sarah@renu.org", "Sarah Developer", Role::Participant)
            .with_department("Engineering"),
    ]
}

pub fn demo_data(now: DateTime<Utc>) -> SeedData {
    let identities = demo_identities();
    let find = |id: &str| {
        identities
            .iter()
            .find(|identity| identity.id == id)
            .cloned()
            .unwrap_or_else(|| Identity::new(id, "", id, Role::Participant))
    };
    let (owner, lead, head, intern, admin, sarah) =
        (find("1"), find("2"), find("3"), find("4"), find("5"), find("6"));

    let users = identities
        .iter()
        .cloned()
        .map(|identity| UserAccount {
            identity,
            password: hash_password(DEMO_PASSWORD),
        })
        .collect();

    let announcements = vec![
        announcement(
            "1",
            &owner,
            "Welcome to Q1 2024 Internship Program",
            "We're excited to welcome all new interns to the Renu Sharma Foundation. This \
             quarter, we have 45 new interns joining across 8 departments. Please make sure to \
             complete your onboarding checklist and attend the orientation session scheduled for \
             next Monday.",
            (Audience::Everyone, None),
            Priority::High,
            true,
            now - Duration::days(2),
            &["4"],
        ),
        announcement(
            "2",
            &head,
            "Engineering Department: New Project Guidelines",
            "All engineering interns should follow the new coding standards and project \
             submission guidelines. Please review the updated documentation in the shared drive \
             and ensure all future submissions comply with these standards.",
            (Audience::SpecificDepartment, Some("Engineering")),
            Priority::Medium,
            false,
            now - Duration::days(1),
            &[],
        ),
        announcement(
            "3",
            &lead,
            "Weekly Report Submission Reminder",
            "This is a reminder that all interns must submit their weekly progress reports by \
             Friday 5 PM. Reports should include completed tasks, challenges faced, and next \
             week's goals. Late submissions will be noted in your performance review.",
            (Audience::ParticipantsOnly, None),
            Priority::Medium,
            false,
            now - Duration::hours(6),
            &[],
        ),
        announcement(
            "4",
            &admin,
            "System Maintenance Scheduled",
            "The internship management system will undergo scheduled maintenance this Saturday \
             from 2 AM to 6 AM. During this time, the system will be unavailable. Please plan \
             accordingly and submit any pending work before Friday.",
            (Audience::Everyone, None),
            Priority::Urgent,
            true,
            now - Duration::hours(2),
            &[],
        ),
    ];

    let certificates = vec![
        Certificate {
            id: "1".to_string(),
            intern_id: intern.id.clone(),
            intern_name: intern.name.clone(),
            intern_email: intern.email.clone(),
            department: intern.department.clone(),
            kind: CertificateKind::OfferLetter,
            file_name: "John_Intern_Offer_Letter.pdf".to_string(),
            file_url: "/files/John_Intern_Offer_Letter.pdf".to_string(),
            uploaded_by: admin.name.clone(),
            status: CertificateStatus::Downloaded,
            uploaded_at: now - Duration::days(7),
            downloaded_at: Some(now - Duration::days(5)),
        },
        Certificate {
            id: "2".to_string(),
            intern_id: intern.id.clone(),
            intern_name: intern.name.clone(),
            intern_email: intern.email.clone(),
            department: intern.department.clone(),
            kind: CertificateKind::CompletionCertificate,
            file_name: "John_Intern_Completion_Certificate.pdf".to_string(),
            file_url: "/files/John_Intern_Completion_Certificate.pdf".to_string(),
            uploaded_by: admin.name.clone(),
            status: CertificateStatus::Available,
            uploaded_at: now - Duration::days(2),
            downloaded_at: None,
        },
        Certificate {
            id: "3".to_string(),
            intern_id: sarah.id.clone(),
            intern_name: sarah.name.clone(),
            intern_email: sarah.email.clone(),
            department: sarah.department.clone(),
            kind: CertificateKind::OfferLetter,
            file_name: "Sarah_Developer_Offer_Letter.pdf".to_string(),
            file_url: "/files/Sarah_Developer_Offer_Letter.pdf".to_string(),
            uploaded_by: admin.name.clone(),
            status: CertificateStatus::Available,
            uploaded_at: now - Duration::days(1),
            downloaded_at: None,
        },
    ];

    let thread_start = now - Duration::hours(2);
    let messages = vec![
        message(
            "1",
            &head,
            &intern,
            "Hi John! How's your project coming along?",
            thread_start,
            true,
        ),
        message(
            "2",
            &intern,
            &head,
            "Hello! It's going well. I've completed the first phase and working on the API \
             integration now.",
            thread_start + Duration::minutes(5),
            true,
        ),
        message(
            "3",
            &head,
            &intern,
            "That's great! Let me know if you need any help with the API documentation.",
            thread_start + Duration::minutes(10),
            true,
        ),
        message(
            "4",
            &lead,
            &intern,
            "John, please submit your weekly report by Friday.",
            now - Duration::minutes(30),
            false,
        ),
    ];

    let meetings = vec![
        meeting(
            "1",
            &lead,
            ("All Hands Meeting", "Monthly company-wide meeting"),
            now + Duration::days(1),
            Duration::minutes(60),
            None,
            &["1", "2", "3", "4", "5"],
            "all-hands",
        ),
        meeting(
            "2",
            &head,
            ("Engineering Team Standup", "Daily standup for engineering team"),
            now + Duration::hours(2),
            Duration::minutes(30),
            Some("Engineering"),
            &["3", "4"],
            "eng-standup",
        ),
        meeting(
            "3",
            &lead,
            ("Project Review", "Q4 project review session"),
            now + Duration::days(3),
            Duration::minutes(90),
            None,
            &["1", "2", "3", "4"],
            "project-review",
        ),
    ];

    SeedData {
        users,
        announcements,
        certificates,
        messages,
        meetings,
    }
}

#[allow(clippy::too_many_arguments)]
fn announcement(
    id: &str,
    author: &Identity,
    title: &str,
    content: &str,
    (target_audience, department): (Audience, Option<&str>),
    priority: Priority,
    pinned: bool,
    created_at: DateTime<Utc>,
    read_by: &[&str],
) -> Announcement {
    Announcement {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        author: AuthorSummary::from(author),
        target_audience,
        department: department.map(str::to_string),
        priority,
        pinned,
        read_by: read_by.iter().map(|id| id.to_string()).collect(),
        created_at,
        updated_at: created_at,
    }
}

fn message(
    id: &str,
    sender: &Identity,
    receiver: &Identity,
    content: &str,
    timestamp: DateTime<Utc>,
    read: bool,
) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        sender_id: sender.id.clone(),
        sender_name: sender.name.clone(),
        sender_role: sender.role,
        receiver_id: receiver.id.clone(),
        content: content.to_string(),
        timestamp,
        read,
    }
}

#[allow(clippy::too_many_arguments)]
fn meeting(
    id: &str,
    organizer: &Identity,
    (title, description): (&str, &str),
    start_time: DateTime<Utc>,
    length: Duration,
    department: Option<&str>,
    attendees: &[&str],
    slug: &str,
) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        start_time,
        end_time: start_time + length,
        organizer: OrganizerSummary::from(organizer),
        department: department.map(str::to_string),
        attendees: attendees.iter().map(|id| id.to_string()).collect(),
        meeting_link: format!("https://meet.example.com/{slug}"),
        status: MeetingStatus::Scheduled,
        attendance: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_accounts_use_demo_password() {
        let data = demo_data(Utc::now());
        assert_eq!(data.users.len(), 6);
        assert!(
            data.users
                .iter()
                .all(|account| account.password.verify(DEMO_PASSWORD))
        );
    }

    #[test]
    fn seeded_department_announcement_names_department() {
        let data = demo_data(Utc::now());
        for announcement in &data.announcements {
            if announcement.target_audience == Audience::SpecificDepartment {
                assert!(announcement.department.is_some());
            }
        }
    }

    #[test]
    fn seeded_departments_are_known() {
        for identity in demo_identities() {
            if let Some(department) = identity.department.as_deref() {
                assert!(DEPARTMENTS.contains(&department));
            }
        }
    }
}
