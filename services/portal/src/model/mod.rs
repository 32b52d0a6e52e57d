//! Portal data model module.
//!
//! # Purpose
//! Re-exports the records owned by the store and returned by the HTTP API:
//! accounts, announcements, certificates, chat messages, meetings, and
//! one-time code challenges.
mod announcement;
mod certificate;
mod challenge;
mod meeting;
mod message;
mod user;

pub use announcement::{Announcement, AnnouncementFilter, AuthorSummary, Priority};
pub use certificate::{
    Certificate, CertificateKind, CertificateStats, CertificateStatus, TransitionError,
};
pub use challenge::{ChallengePurpose, CodeChallenge, PendingRegistration};
pub use meeting::{
    AttendanceError, AttendanceRecord, AttendanceStatus, AttendanceView, Meeting, MeetingStatus,
    OrganizerSummary, attendance_percentage,
};
pub use message::{ChatMessage, Conversation};
pub use user::UserAccount;
