//! Authenticated identity shared by server responses and client sessions.
//!
//! # Key invariants
//! - The serialized shape is `{id, email, name, role, department?}`; clients
//!   persist exactly this object.
//! - An identity is immutable for the lifetime of a session.
use crate::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// True when both sides carry a department and the names match.
    pub fn in_department(&self, department: Option<&str>) -> bool {
        match (self.department.as_deref(), department) {
            (Some(own), Some(other)) => own == other,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_match_requires_both_sides() {
        let head = Identity::new("3", "hod@renu.org", "Head", Role::DepartmentHead)
            .with_department("Engineering");
        let admin = Identity::new("5", "admin@renu.org", "Admin", Role::SystemAdmin);

        assert!(head.in_department(Some("Engineering")));
        assert!(!head.in_department(Some("Marketing")));
        assert!(!head.in_department(None));
        assert!(!admin.in_department(None));
    }

    #[test]
    fn persisted_shape_omits_missing_department() {
        let admin = Identity::new("5", "admin@renu.org", "System Admin", Role::SystemAdmin);
        let value = serde_json::to_value(&admin).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": "5",
                "email": "admin@renu.org",
                "name": "System Admin",
                "role": "system_admin"
            })
        );
        let parsed: Identity = serde_json::from_value(value).expect("parse");
        assert_eq!(parsed, admin);
    }
}
