//! InternHub identity types and authorization policy shared by the portal
//! service and its clients.
//!
//! # Purpose
//! Centralizes the role model and every visibility/permission predicate so
//! the service enforces one rule set and clients render from the same one.
//!
//! # How it fits
//! The portal service calls these predicates before returning or mutating
//! records; the client crate reuses [`Identity`] as its persisted session
//! shape and [`navigation_for`] to build menus.
//!
//! # Key invariants
//! - Every predicate is a pure function of its arguments.
//! - A `SpecificDepartment` audience always carries a department once it has
//!   passed [`validate_announcement_target`].
//!
//! # Examples
//! ```rust
//! use internhub_policy::{Audience, Identity, Role, can_view_announcement};
//!
//! let head = Identity::new("3", "hod@renu.org", "Department Head", Role::DepartmentHead)
//!     .with_department("Engineering");
//! assert!(can_view_announcement(&head, Audience::SpecificDepartment, Some("Engineering")));
//! assert!(!can_view_announcement(&head, Audience::ParticipantsOnly, None));
//! ```

mod audience;
mod errors;
mod identity;
mod navigation;
mod policy;
mod role;

pub use audience::{Audience, AudienceScope};
pub use errors::{PolicyError, PolicyResult};
pub use identity::Identity;
pub use navigation::{NavItem, navigation_for};
pub use policy::{
    allowed_audiences, can_create_announcement, can_download_certificate, can_list_users,
    can_message, can_schedule_meeting, can_upload_certificate, can_view_announcement,
    can_view_certificate, can_view_meeting, can_view_user, chat_contact_roles,
    validate_announcement_target,
};
pub use role::Role;
