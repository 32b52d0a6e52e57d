//! InternHub client library.
//!
//! # Purpose
//! Talks to the portal HTTP API and owns the client-side session: the
//! authenticated [`Identity`] and its bearer token, persisted through an
//! injected [`SessionStorage`].
//!
//! # How it fits
//! [`PortalClient`] is the transport. [`SessionService`] drives the
//! `Unauthenticated -> Authenticating -> Authenticated` lifecycle on top of
//! the [`AuthApi`] seam, so tests can swap the transport for a fake.
//!
//! # Examples
//! ```rust,no_run
//! use internhub_client::{ClientConfig, MemorySessionStorage, PortalClient, SessionService};
//! use internhub_policy::Role;
//!
//! # async fn demo() -> Result<(), internhub_client::ClientError> {
//! let client = PortalClient::new(ClientConfig::default())?;
//! let mut session = SessionService::new(client, MemorySessionStorage::default());
//! session.restore()?;
//! let me = session.login("intern@renu.org", "password", Role::Participant).await?;
//! println!("signed in as {}", me.name);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
mod session;
mod storage;
mod types;

pub use client::{AuthApi, PortalClient};
pub use config::ClientConfig;
pub use error::{ApiErrorBody, ClientError, ClientResult};
pub use internhub_policy::Identity;
pub use session::{SessionService, SessionState};
pub use storage::{
    FileSessionStorage, MemorySessionStorage, SESSION_TOKEN_KEY, SessionStorage, StorageError,
    USER_KEY,
};
pub use types::{
    CodeIssued, Items, LoginRequest, NavEntry, PasswordResetConfirm, RegisterRequest,
    SessionGrant, VerifyCode,
};
