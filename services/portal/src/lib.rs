//! InternHub portal service library crate.
//!
//! # Purpose
//! Exposes the portal API surface, session handling, configuration, and the
//! storage backend for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
