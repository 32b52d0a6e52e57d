//! Scheduled meetings and per-attendee presence tracking.
//!
//! # Key invariants
//! - `status` follows the `[start_time, end_time)` window on every read unless
//!   the meeting was cancelled; cancellation is terminal.
//! - Presence is clipped to the scheduled window and accumulates across
//!   repeated join/leave pairs. Percentage and status are derived on read.
use chrono::{DateTime, Utc};
use internhub_policy::{Identity, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Presence strictly above this share of the window counts as present.
const PRESENT_THRESHOLD_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Partial,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("meeting was cancelled")]
    Cancelled,
    #[error("meeting has already ended")]
    Ended,
    #[error("not currently joined")]
    NotJoined,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizerSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<&Identity> for OrganizerSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            role: identity.role,
        }
    }
}

/// Raw presence bookkeeping for one user in one meeting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub user_id: String,
    pub user_name: String,
    /// Set while the user is inside the meeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
    pub present_seconds: i64,
}

/// Attendance as reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceView {
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
    pub present_seconds: i64,
    pub percentage: f64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub organizer: OrganizerSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub attendees: Vec<String>,
    pub meeting_link: String,
    pub status: MeetingStatus,
    #[serde(skip)]
    pub attendance: Vec<AttendanceRecord>,
}

/// Share of `scheduled_seconds` covered by `present_seconds`, in `0..=100`.
pub fn attendance_percentage(present_seconds: i64, scheduled_seconds: i64) -> f64 {
    if scheduled_seconds <= 0 {
        return 0.0;
    }
    let ratio = present_seconds.max(0) as f64 / scheduled_seconds as f64;
    (ratio * 100.0).min(100.0)
}

impl Meeting {
    pub fn scheduled_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> MeetingStatus {
        if self.status == MeetingStatus::Cancelled {
            MeetingStatus::Cancelled
        } else if now < self.start_time {
            MeetingStatus::Scheduled
        } else if now < self.end_time {
            MeetingStatus::Ongoing
        } else {
            MeetingStatus::Completed
        }
    }

    pub fn refresh_status(&mut self, now: DateTime<Utc>) {
        self.status = self.status_at(now);
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now && self.status != MeetingStatus::Cancelled
    }

    /// Cancel the meeting. Cancelling twice is a no-op.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), AttendanceError> {
        match self.status_at(now) {
            MeetingStatus::Completed => Err(AttendanceError::Ended),
            _ => {
                self.status = MeetingStatus::Cancelled;
                Ok(())
            }
        }
    }

    /// Open a presence interval for `user`. Joining while already inside keeps
    /// the original join time.
    pub fn join(&mut self, user: &Identity, now: DateTime<Utc>) -> Result<(), AttendanceError> {
        match self.status_at(now) {
            MeetingStatus::Cancelled => return Err(AttendanceError::Cancelled),
            MeetingStatus::Completed => return Err(AttendanceError::Ended),
            MeetingStatus::Scheduled | MeetingStatus::Ongoing => {}
        }
        if let Some(record) = self.record_mut(&user.id) {
            if record.joined_at.is_none() {
                record.joined_at = Some(now);
            }
            return Ok(());
        }
        self.attendance.push(AttendanceRecord {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            joined_at: Some(now),
            left_at: None,
            present_seconds: 0,
        });
        Ok(())
    }

    /// Close the open presence interval for `user_id`.
    pub fn leave(&mut self, user_id: &str, now: DateTime<Utc>) -> Result<(), AttendanceError> {
        let (start, end) = (self.start_time, self.end_time);
        let record = self
            .record_mut(user_id)
            .ok_or(AttendanceError::NotJoined)?;
        let joined_at = record.joined_at.take().ok_or(AttendanceError::NotJoined)?;
        record.present_seconds += clipped_seconds(joined_at, now, start, end);
        record.left_at = Some(now);
        Ok(())
    }

    pub fn attendance_for(&self, user_id: &str, now: DateTime<Utc>) -> Option<AttendanceView> {
        self.attendance
            .iter()
            .find(|record| record.user_id == user_id)
            .map(|record| self.view(record, now))
    }

    /// One entry per attendee and per recorded joiner. Attendees who never
    /// joined are reported absent.
    pub fn attendance_views(
        &self,
        now: DateTime<Utc>,
        resolve_name: impl Fn(&str) -> Option<String>,
    ) -> Vec<AttendanceView> {
        let mut views: Vec<AttendanceView> = self
            .attendance
            .iter()
            .map(|record| self.view(record, now))
            .collect();
        for attendee in &self.attendees {
            if views.iter().any(|view| view.user_id == *attendee) {
                continue;
            }
            views.push(AttendanceView {
                user_id: attendee.clone(),
                user_name: resolve_name(attendee).unwrap_or_else(|| attendee.clone()),
                joined_at: None,
                left_at: None,
                present_seconds: 0,
                percentage: 0.0,
                status: AttendanceStatus::Absent,
            });
        }
        views
    }

    fn record_mut(&mut self, user_id: &str) -> Option<&mut AttendanceRecord> {
        self.attendance
            .iter_mut()
            .find(|record| record.user_id == user_id)
    }

    fn view(&self, record: &AttendanceRecord, now: DateTime<Utc>) -> AttendanceView {
        let open = record
            .joined_at
            .map(|joined_at| clipped_seconds(joined_at, now, self.start_time, self.end_time))
            .unwrap_or(0);
        let present_seconds = record.present_seconds + open;
        let percentage = attendance_percentage(present_seconds, self.scheduled_seconds());
        let status = if percentage > PRESENT_THRESHOLD_PERCENT {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Partial
        };
        AttendanceView {
            user_id: record.user_id.clone(),
            user_name: record.user_name.clone(),
            joined_at: record.joined_at,
            left_at: record.left_at,
            present_seconds,
            percentage,
            status,
        }
    }
}

fn clipped_seconds(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> i64 {
    let from = from.max(start);
    let to = to.min(end);
    (to - from).num_seconds().max(0)
}
