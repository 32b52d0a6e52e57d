//! Visibility and permission predicates.
//!
//! # Purpose and responsibility
//! One function per decision, each a pure match over [`Role`] plus the
//! record fields it needs. Handlers call these instead of branching on role
//! themselves.
//!
//! # Key invariants and assumptions
//! - Visibility is an OR over independent clauses; order never matters.
//! - Department comparisons go through [`Identity::in_department`], so a
//!   missing department never matches anything.
//!
//! # Security considerations
//! - These checks are the trust boundary; the service must apply them before
//!   serializing any record.
use crate::audience::{Audience, AudienceScope};
use crate::errors::{PolicyError, PolicyResult};
use crate::identity::Identity;
use crate::role::Role;

const ANY_AUDIENCE: &[Audience] = &Audience::ALL;
const DEPARTMENT_HEAD_AUDIENCES: &[Audience] =
    &[Audience::SpecificDepartment, Audience::ParticipantsOnly];

/// Decide whether an announcement is visible to `identity`.
pub fn can_view_announcement(
    identity: &Identity,
    audience: Audience,
    department: Option<&str>,
) -> bool {
    let everyone = audience == Audience::Everyone;
    let heads = audience == Audience::DepartmentHeadsOnly && identity.role == Role::DepartmentHead;
    let participants =
        audience == Audience::ParticipantsOnly && identity.role == Role::Participant;
    let department_scoped = audience == Audience::SpecificDepartment
        && (identity.in_department(department) || identity.role.is_organization_wide());
    everyone || heads || participants || department_scoped
}

pub fn can_create_announcement(role: Role) -> bool {
    matches!(
        role,
        Role::Owner | Role::OperationsLead | Role::DepartmentHead | Role::SystemAdmin
    )
}

/// Audiences a role may target when creating an announcement.
pub fn allowed_audiences(role: Role) -> &'static [Audience] {
    match role {
        Role::Owner | Role::OperationsLead | Role::SystemAdmin => ANY_AUDIENCE,
        Role::DepartmentHead => DEPARTMENT_HEAD_AUDIENCES,
        Role::Participant => &[],
    }
}

/// Check that `creator` may publish to the requested audience and return the
/// validated scope.
///
/// # Errors
/// - `CannotAnnounce` when the role has no creation permission.
/// - `AudienceNotAllowed` when the audience is outside [`allowed_audiences`].
/// - `MissingDepartment` when a department audience names no department.
/// - `ForeignDepartment` when a department head targets another department.
pub fn validate_announcement_target(
    creator: &Identity,
    audience: Audience,
    department: Option<&str>,
) -> PolicyResult<AudienceScope> {
    if !can_create_announcement(creator.role) {
        return Err(PolicyError::CannotAnnounce(creator.role));
    }
    if !allowed_audiences(creator.role).contains(&audience) {
        return Err(PolicyError::AudienceNotAllowed {
            role: creator.role,
            audience,
        });
    }
    let scope = AudienceScope::from_parts(audience, department)?;
    if creator.role == Role::DepartmentHead
        && let AudienceScope::Department(name) = &scope
        && !creator.in_department(Some(name))
    {
        return Err(PolicyError::ForeignDepartment);
    }
    Ok(scope)
}

pub fn can_view_certificate(identity: &Identity, owner_id: &str) -> bool {
    match identity.role {
        Role::SystemAdmin => true,
        Role::Participant => identity.id == owner_id,
        Role::Owner | Role::OperationsLead | Role::DepartmentHead => false,
    }
}

pub fn can_upload_certificate(role: Role) -> bool {
    role == Role::SystemAdmin
}

pub fn can_download_certificate(identity: &Identity, owner_id: &str) -> bool {
    can_view_certificate(identity, owner_id)
}

/// Roles `role` may open a chat with. Empty means the role has no chat.
pub fn chat_contact_roles(role: Role) -> &'static [Role] {
    match role {
        Role::Participant => &[Role::DepartmentHead, Role::OperationsLead],
        Role::DepartmentHead => &[Role::Participant, Role::OperationsLead],
        Role::OperationsLead => &[Role::Participant, Role::DepartmentHead],
        Role::Owner | Role::SystemAdmin => &[],
    }
}

pub fn can_message(sender: Role, receiver: Role) -> bool {
    chat_contact_roles(sender).contains(&receiver)
}

pub fn can_schedule_meeting(role: Role) -> bool {
    matches!(role, Role::OperationsLead | Role::SystemAdmin)
}

pub fn can_view_meeting(
    identity: &Identity,
    organizer_id: &str,
    department: Option<&str>,
    attendees: &[String],
) -> bool {
    identity.role.is_organization_wide()
        || identity.id == organizer_id
        || attendees.iter().any(|id| *id == identity.id)
        || department.is_none()
        || identity.in_department(department)
}

/// Whether the role may open the user directory at all.
pub fn can_list_users(role: Role) -> bool {
    matches!(
        role,
        Role::OperationsLead | Role::DepartmentHead | Role::SystemAdmin
    )
}

pub fn can_view_user(viewer: &Identity, target: &Identity) -> bool {
    match viewer.role {
        Role::OperationsLead | Role::SystemAdmin => true,
        Role::DepartmentHead => viewer.in_department(target.department.as_deref()),
        Role::Owner | Role::Participant => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Identity {
        Identity::new("1", "ceo@renu.org", "Renu Sharma", Role::Owner)
    }

    fn operations_lead() -> Identity {
        Identity::new("2", "coo@renu.org", "Operations Head", Role::OperationsLead)
    }

    fn head(department: &str) -> Identity {
        Identity::new("3", "hod@renu.org", "Department Head", Role::DepartmentHead)
            .with_department(department)
    }

    fn participant(id: &str, department: &str) -> Identity {
        Identity::new(id, "intern@renu.org", "John Intern", Role::Participant)
            .with_department(department)
    }

    fn admin() -> Identity {
        Identity::new("5", "admin@renu.org", "System Admin", Role::SystemAdmin)
    }

    #[test]
    fn everyone_audience_is_visible_to_all_roles() {
        for identity in [
            owner(),
            operations_lead(),
            head("Engineering"),
            participant("4", "Engineering"),
            admin(),
        ] {
            assert!(can_view_announcement(&identity, Audience::Everyone, None));
        }
    }

    #[test]
    fn role_only_audiences_match_exact_role() {
        assert!(can_view_announcement(
            &head("Engineering"),
            Audience::DepartmentHeadsOnly,
            None
        ));
        assert!(!can_view_announcement(
            &owner(),
            Audience::DepartmentHeadsOnly,
            None
        ));
        assert!(can_view_announcement(
            &participant("4", "Engineering"),
            Audience::ParticipantsOnly,
            None
        ));
        assert!(!can_view_announcement(
            &operations_lead(),
            Audience::ParticipantsOnly,
            None
        ));
    }

    #[test]
    fn department_audience_matches_department_or_org_wide_roles() {
        let engineering = Some("Engineering");
        assert!(can_view_announcement(
            &head("Engineering"),
            Audience::SpecificDepartment,
            engineering
        ));
        assert!(!can_view_announcement(
            &head("Marketing"),
            Audience::SpecificDepartment,
            engineering
        ));
        assert!(can_view_announcement(
            &operations_lead(),
            Audience::SpecificDepartment,
            engineering
        ));
        assert!(can_view_announcement(
            &owner(),
            Audience::SpecificDepartment,
            engineering
        ));
        assert!(can_view_announcement(
            &admin(),
            Audience::SpecificDepartment,
            engineering
        ));
        assert!(!can_view_announcement(
            &participant("4", "Design"),
            Audience::SpecificDepartment,
            engineering
        ));
    }

    #[test]
    fn visibility_is_stable_under_reevaluation() {
        let identity = head("Engineering");
        for audience in Audience::ALL {
            for department in [None, Some("Engineering"), Some("Marketing")] {
                let first = can_view_announcement(&identity, audience, department);
                let second = can_view_announcement(&identity, audience, department);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn announcement_creation_roles() {
        assert!(can_create_announcement(Role::Owner));
        assert!(can_create_announcement(Role::OperationsLead));
        assert!(can_create_announcement(Role::DepartmentHead));
        assert!(can_create_announcement(Role::SystemAdmin));
        assert!(!can_create_announcement(Role::Participant));
        assert!(allowed_audiences(Role::Participant).is_empty());
    }

    #[test]
    fn department_head_target_rules() {
        let creator = head("Engineering");

        let err = validate_announcement_target(&creator, Audience::SpecificDepartment, None)
            .expect_err("missing department");
        assert_eq!(err, PolicyError::MissingDepartment);

        let err = validate_announcement_target(
            &creator,
            Audience::SpecificDepartment,
            Some("Marketing"),
        )
        .expect_err("foreign department");
        assert_eq!(err, PolicyError::ForeignDepartment);

        let err = validate_announcement_target(&creator, Audience::Everyone, None)
            .expect_err("everyone not allowed");
        assert!(matches!(err, PolicyError::AudienceNotAllowed { .. }));

        let scope = validate_announcement_target(
            &creator,
            Audience::SpecificDepartment,
            Some("Engineering"),
        )
        .expect("own department");
        assert_eq!(scope.department(), Some("Engineering"));

        let scope = validate_announcement_target(&creator, Audience::ParticipantsOnly, None)
            .expect("participants");
        assert_eq!(scope, AudienceScope::ParticipantsOnly);
    }

    #[test]
    fn participants_cannot_announce() {
        let err = validate_announcement_target(
            &participant("4", "Engineering"),
            Audience::Everyone,
            None,
        )
        .expect_err("participant");
        assert_eq!(err, PolicyError::CannotAnnounce(Role::Participant));
    }

    #[test]
    fn certificate_rules() {
        assert!(can_view_certificate(&admin(), "4"));
        assert!(can_view_certificate(&participant("4", "Engineering"), "4"));
        assert!(!can_view_certificate(&participant("6", "Engineering"), "4"));
        assert!(!can_view_certificate(&operations_lead(), "4"));
        assert!(can_upload_certificate(Role::SystemAdmin));
        assert!(!can_upload_certificate(Role::Owner));
        assert!(can_download_certificate(&participant("4", "Engineering"), "4"));
        assert!(!can_download_certificate(&head("Engineering"), "4"));
    }

    #[test]
    fn participant_contacts_exclude_peers_and_admins() {
        let roles = chat_contact_roles(Role::Participant);
        assert!(!roles.contains(&Role::Participant));
        assert!(!roles.contains(&Role::SystemAdmin));
        assert!(!roles.contains(&Role::Owner));
        assert!(roles.contains(&Role::DepartmentHead));
        assert!(roles.contains(&Role::OperationsLead));
    }

    #[test]
    fn chat_contact_matrix() {
        assert!(can_message(Role::DepartmentHead, Role::Participant));
        assert!(can_message(Role::DepartmentHead, Role::OperationsLead));
        assert!(can_message(Role::OperationsLead, Role::Participant));
        assert!(can_message(Role::OperationsLead, Role::DepartmentHead));
        assert!(!can_message(Role::OperationsLead, Role::Owner));
        assert!(chat_contact_roles(Role::Owner).is_empty());
        assert!(chat_contact_roles(Role::SystemAdmin).is_empty());
    }

    #[test]
    fn meeting_rules() {
        assert!(can_schedule_meeting(Role::OperationsLead));
        assert!(can_schedule_meeting(Role::SystemAdmin));
        assert!(!can_schedule_meeting(Role::Owner));
        assert!(!can_schedule_meeting(Role::DepartmentHead));

        let attendees = vec!["3".to_string()];
        let design = participant("7", "Design");
        assert!(can_view_meeting(&design, "2", None, &attendees));
        assert!(!can_view_meeting(&design, "2", Some("Engineering"), &attendees));
        assert!(can_view_meeting(
            &participant("4", "Engineering"),
            "2",
            Some("Engineering"),
            &[]
        ));
        assert!(can_view_meeting(&head("Marketing"), "2", Some("Engineering"), &attendees));
        assert!(can_view_meeting(&owner(), "2", Some("Engineering"), &[]));
    }

    #[test]
    fn user_directory_rules() {
        let engineer = participant("4", "Engineering");
        let designer = participant("7", "Design");
        assert!(can_list_users(Role::DepartmentHead));
        assert!(!can_list_users(Role::Participant));
        assert!(!can_list_users(Role::Owner));
        assert!(can_view_user(&head("Engineering"), &engineer));
        assert!(!can_view_user(&head("Engineering"), &designer));
        assert!(can_view_user(&admin(), &designer));
    }
}
