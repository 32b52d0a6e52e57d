use serde::{Deserialize, Serialize};

/// Fixed permission class of an identity.
///
/// The original dashboard labelled these CEO, COO, HOD, Intern and Admin;
/// [`Role::label`] keeps those labels for display and `FromStr` accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    OperationsLead,
    DepartmentHead,
    Participant,
    SystemAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Owner,
        Role::OperationsLead,
        Role::DepartmentHead,
        Role::Participant,
        Role::SystemAdmin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::OperationsLead => "operations_lead",
            Role::DepartmentHead => "department_head",
            Role::Participant => "participant",
            Role::SystemAdmin => "system_admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Owner => "CEO",
            Role::OperationsLead => "COO",
            Role::DepartmentHead => "HOD",
            Role::Participant => "Intern",
            Role::SystemAdmin => "Admin",
        }
    }

    /// Roles that see every department's records.
    pub fn is_organization_wide(self) -> bool {
        matches!(
            self,
            Role::Owner | Role::OperationsLead | Role::SystemAdmin
        )
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "owner" | "CEO" => Ok(Role::Owner),
            "operations_lead" | "COO" => Ok(Role::OperationsLead),
            "department_head" | "HOD" => Ok(Role::DepartmentHead),
            "participant" | "Intern" => Ok(Role::Participant),
            "system_admin" | "Admin" => Ok(Role::SystemAdmin),
            _ => Err(()),
        }
    }
}
