use crate::audience::Audience;
use crate::role::Role;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("role {0} may not create announcements")]
    CannotAnnounce(Role),
    #[error("role {role} may not target audience {audience}")]
    AudienceNotAllowed { role: Role, audience: Audience },
    #[error("department audience requires a department")]
    MissingDepartment,
    #[error("department heads may only target their own department")]
    ForeignDepartment,
}

impl PolicyError {
    /// Invariant violations in the request itself, as opposed to denials.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PolicyError::MissingDepartment)
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
