//! Portal HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules, shared payload types, and error helpers.
pub mod announcements;
pub mod certificates;
pub mod directory;
pub mod error;
pub mod meetings;
pub mod messages;
pub mod openapi;
pub mod request_id;
pub mod system;
pub mod types;
