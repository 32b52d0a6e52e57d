//! Announcement audiences.
//!
//! [`Audience`] is the wire-level tag; [`AudienceScope`] is the validated
//! form where a department audience always names its department.
use crate::errors::{PolicyError, PolicyResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Everyone,
    DepartmentHeadsOnly,
    ParticipantsOnly,
    SpecificDepartment,
}

impl Audience {
    pub const ALL: [Audience; 4] = [
        Audience::Everyone,
        Audience::DepartmentHeadsOnly,
        Audience::ParticipantsOnly,
        Audience::SpecificDepartment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Everyone => "everyone",
            Audience::DepartmentHeadsOnly => "department_heads_only",
            Audience::ParticipantsOnly => "participants_only",
            Audience::SpecificDepartment => "specific_department",
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudienceScope {
    Everyone,
    DepartmentHeadsOnly,
    ParticipantsOnly,
    Department(String),
}

impl AudienceScope {
    /// Combine a wire audience with its optional department.
    ///
    /// A department attached to a non-department audience is dropped. Blank
    /// department names count as missing.
    pub fn from_parts(audience: Audience, department: Option<&str>) -> PolicyResult<Self> {
        match audience {
            Audience::Everyone => Ok(AudienceScope::Everyone),
            Audience::DepartmentHeadsOnly => Ok(AudienceScope::DepartmentHeadsOnly),
            Audience::ParticipantsOnly => Ok(AudienceScope::ParticipantsOnly),
            Audience::SpecificDepartment => match department.map(str::trim) {
                Some(name) if !name.is_empty() => Ok(AudienceScope::Department(name.to_string())),
                _ => Err(PolicyError::MissingDepartment),
            },
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            AudienceScope::Everyone => Audience::Everyone,
            AudienceScope::DepartmentHeadsOnly => Audience::DepartmentHeadsOnly,
            AudienceScope::ParticipantsOnly => Audience::ParticipantsOnly,
            AudienceScope::Department(_) => Audience::SpecificDepartment,
        }
    }

    pub fn department(&self) -> Option<&str> {
        match self {
            AudienceScope::Department(name) => Some(name),
            _ => None,
        }
    }
}
