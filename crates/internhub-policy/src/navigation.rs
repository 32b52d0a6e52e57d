//! Role-shaped dashboard menu.
//!
//! # Key invariants
//! - [`navigation_for`] always returns items in [`NavItem::ALL`] order.
//! - Dashboard, meetings, attendance and announcements are shown to every
//!   role; the remaining items follow the role matrix in
//!   [`NavItem::allowed_roles`].
use crate::role::Role;
use serde::{Deserialize, Serialize};

const EVERY_ROLE: &[Role] = &Role::ALL;

/// Dashboard menu entries, each with a fixed allowed-role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NavItem {
    Dashboard,
    Meetings,
    Attendance,
    Chat,
    Announcements,
    Certificates,
    UserManagement,
}

impl NavItem {
    pub const ALL: [NavItem; 7] = [
        NavItem::Dashboard,
        NavItem::Meetings,
        NavItem::Attendance,
        NavItem::Chat,
        NavItem::Announcements,
        NavItem::Certificates,
        NavItem::UserManagement,
    ];

    pub fn id(self) -> &'static str {
        match self {
            NavItem::Dashboard => "dashboard",
            NavItem::Meetings => "meetings",
            NavItem::Attendance => "attendance",
            NavItem::Chat => "chat",
            NavItem::Announcements => "announcements",
            NavItem::Certificates => "certificates",
            NavItem::UserManagement => "users",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavItem::Dashboard => "Dashboard",
            NavItem::Meetings => "Meetings",
            NavItem::Attendance => "Attendance",
            NavItem::Chat => "Chat",
            NavItem::Announcements => "Announcements",
            NavItem::Certificates => "Certificates",
            NavItem::UserManagement => "User Management",
        }
    }

    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            NavItem::Dashboard
            | NavItem::Meetings
            | NavItem::Attendance
            | NavItem::Announcements => EVERY_ROLE,
            NavItem::Chat => &[Role::OperationsLead, Role::DepartmentHead, Role::Participant],
            NavItem::Certificates => &[Role::Participant, Role::SystemAdmin],
            NavItem::UserManagement => {
                &[Role::OperationsLead, Role::DepartmentHead, Role::SystemAdmin]
            }
        }
    }

    pub fn visible_to(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Menu items for `role`, in display order.
pub fn navigation_for(role: Role) -> Vec<NavItem> {
    NavItem::ALL
        .into_iter()
        .filter(|item| item.visible_to(role))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_menu() {
        assert_eq!(
            navigation_for(Role::Participant),
            vec![
                NavItem::Dashboard,
                NavItem::Meetings,
                NavItem::Attendance,
                NavItem::Chat,
                NavItem::Announcements,
                NavItem::Certificates,
            ]
        );
    }

    #[test]
    fn owner_menu_has_no_chat_or_certificates() {
        let items = navigation_for(Role::Owner);
        assert!(!items.contains(&NavItem::Chat));
        assert!(!items.contains(&NavItem::Certificates));
        assert!(!items.contains(&NavItem::UserManagement));
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn chat_menu_matches_contact_roles() {
        for role in Role::ALL {
            assert_eq!(
                NavItem::Chat.visible_to(role),
                !crate::chat_contact_roles(role).is_empty()
            );
        }
    }

    #[test]
    fn every_item_has_distinct_id() {
        let mut ids: Vec<_> = NavItem::ALL.iter().map(|item| item.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), NavItem::ALL.len());
    }
}
