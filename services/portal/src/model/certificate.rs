//! Certificate records with a forward-only status lifecycle.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    OfferLetter,
    CompletionCertificate,
}

impl CertificateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CertificateKind::OfferLetter => "offer_letter",
            CertificateKind::CompletionCertificate => "completion_certificate",
        }
    }
}

/// Lifecycle state. Ordering follows the only allowed direction of travel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Pending,
    Available,
    Downloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("certificate is not available for download yet")]
    NotAvailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    pub id: String,
    pub intern_id: String,
    pub intern_name: String,
    pub intern_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub kind: CertificateKind,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_by: String,
    pub status: CertificateStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Move a pending record to available. Returns false when nothing changed.
    pub fn publish(&mut self) -> bool {
        if self.status == CertificateStatus::Pending {
            self.status = CertificateStatus::Available;
            return true;
        }
        false
    }

    /// Record a download by the owning participant.
    ///
    /// Repeated downloads re-stamp `downloaded_at`; the status never moves
    /// backward.
    pub fn record_download(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status < CertificateStatus::Available {
            return Err(TransitionError::NotAvailable);
        }
        self.status = CertificateStatus::Downloaded;
        self.downloaded_at = Some(at);
        Ok(())
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.intern_name.to_lowercase().contains(&query)
            || self.file_name.to_lowercase().contains(&query)
            || self
                .department
                .as_deref()
                .is_some_and(|department| department.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CertificateStats {
    pub total: usize,
    pub pending: usize,
    pub available: usize,
    pub downloaded: usize,
}

impl CertificateStats {
    pub fn tally<'a>(certificates: impl IntoIterator<Item = &'a Certificate>) -> Self {
        certificates
            .into_iter()
            .fold(Self::default(), |mut stats, certificate| {
                stats.total += 1;
                match certificate.status {
                    CertificateStatus::Pending => stats.pending += 1,
                    CertificateStatus::Available => stats.available += 1,
                    CertificateStatus::Downloaded => stats.downloaded += 1,
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn certificate(status: CertificateStatus) -> Certificate {
        Certificate {
            id: "1".to_string(),
            intern_id: "4".to_string(),
            intern_name: "John Intern".to_string(),
            intern_email: "intern@renu.org".to_string(),
            department: Some("Engineering".to_string()),
            kind: CertificateKind::OfferLetter,
            file_name: "offer_letter_john_intern.pdf".to_string(),
            file_url: "/files/offer_letter_john_intern.pdf".to_string(),
            uploaded_by: "System Admin".to_string(),
            status,
            uploaded_at: Utc::now(),
            downloaded_at: None,
        }
    }

    #[test]
    fn pending_cannot_be_downloaded() {
        let mut record = certificate(CertificateStatus::Pending);
        assert_eq!(
            record.record_download(Utc::now()),
            Err(TransitionError::NotAvailable)
        );
        assert_eq!(record.status, CertificateStatus::Pending);
        assert!(record.downloaded_at.is_none());
    }

    #[test]
    fn status_only_moves_forward() {
        let mut record = certificate(CertificateStatus::Pending);
        assert!(record.publish());
        assert_eq!(record.status, CertificateStatus::Available);

        let first = Utc::now();
        record.record_download(first).expect("download");
        assert_eq!(record.status, CertificateStatus::Downloaded);

        assert!(!record.publish());
        assert_eq!(record.status, CertificateStatus::Downloaded);

        let second = first + Duration::minutes(5);
        record.record_download(second).expect("download again");
        assert_eq!(record.status, CertificateStatus::Downloaded);
        assert_eq!(record.downloaded_at, Some(second));
    }

    #[test]
    fn query_covers_name_file_and_department() {
        let record = certificate(CertificateStatus::Available);
        assert!(record.matches_query("john"));
        assert!(record.matches_query("OFFER_LETTER"));
        assert!(record.matches_query("engineer"));
        assert!(!record.matches_query("marketing"));
    }

    #[test]
    fn stats_tally_by_status() {
        let records = [
            certificate(CertificateStatus::Pending),
            certificate(CertificateStatus::Available),
            certificate(CertificateStatus::Available),
            certificate(CertificateStatus::Downloaded),
        ];
        let stats = CertificateStats::tally(&records);
        assert_eq!(
            stats,
            CertificateStats {
                total: 4,
                pending: 1,
                available: 2,
                downloaded: 1,
            }
        );
    }
}
