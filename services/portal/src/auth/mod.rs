//! Portal authentication modules.
//!
//! # Purpose
//! Groups password digests, session token minting/verification, one-time
//! codes, bearer-session resolution, and the session HTTP handlers.
pub mod credentials;
pub mod handlers;
pub mod keys;
pub mod otp;
pub mod session;
pub mod session_token;
