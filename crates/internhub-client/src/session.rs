//! Client session lifecycle.
//!
//! # Purpose
//! Owns the signed-in identity and its bearer token. State moves
//! `Unauthenticated -> Authenticating -> Authenticated` on login or verified
//! registration and back to `Unauthenticated` on logout or failure.
//!
//! # Key invariants
//! - Storage is read once, by [`SessionService::restore`]; afterwards the
//!   in-memory state is authoritative and every change is written through.
//! - `Authenticated` always has both the identity and the token persisted.
//! - Logout clears local state even when the portal cannot be reached.
//! - A failed login or registration leaves no session behind, including
//!   one that was active before the attempt.
use crate::client::AuthApi;
use crate::error::{ClientError, ClientResult};
use crate::storage::{SESSION_TOKEN_KEY, SessionStorage, StorageError, USER_KEY};
use crate::types::{CodeIssued, LoginRequest, RegisterRequest, SessionGrant, VerifyCode};
use internhub_policy::{Identity, NavItem, Role, navigation_for};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated(Identity),
}

pub struct SessionService<A, S> {
    api: A,
    storage: S,
    state: SessionState,
    token: Option<String>,
    restored: bool,
}

impl<A: AuthApi, S: SessionStorage> SessionService<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            state: SessionState::Unauthenticated,
            token: None,
            restored: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self.state {
            SessionState::Authenticated(_) => self.token.as_deref(),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Menu for the signed-in role; empty when signed out.
    pub fn navigation(&self) -> Vec<NavItem> {
        self.identity()
            .map(|identity| navigation_for(identity.role))
            .unwrap_or_default()
    }

    /// Load the persisted session. Only the first call reads storage.
    ///
    /// A stored identity that no longer decodes, or an identity without a
    /// token, is discarded and cleared rather than reported.
    pub fn restore(&mut self) -> ClientResult<&SessionState> {
        if self.restored {
            return Ok(&self.state);
        }
        self.restored = true;

        let loaded = self
            .storage
            .load(USER_KEY)
            .and_then(|user| Ok((user, self.storage.load(SESSION_TOKEN_KEY)?)));
        let (user, token) = match loaded {
            Ok(pair) => pair,
            Err(StorageError::Corrupt(err)) => {
                tracing::warn!(error = %err, "discarding unreadable stored session");
                self.clear_storage()?;
                return Ok(&self.state);
            }
            Err(err) => return Err(err.into()),
        };

        let identity = user.and_then(|value| match serde_json::from_value::<Identity>(value) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "discarding stored identity with unexpected shape");
                None
            }
        });
        let token = token.and_then(|value| match value {
            Value::String(token) if !token.is_empty() => Some(token),
            _ => None,
        });

        match (identity, token) {
            (Some(identity), Some(token)) => {
                tracing::debug!(user_id = %identity.id, "session restored");
                self.token = Some(token);
                self.state = SessionState::Authenticated(identity);
            }
            (None, None) => {}
            _ => self.clear_storage()?,
        }
        Ok(&self.state)
    }

    /// Sign in with email, password, and the role the user claims.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        role: Role,
    ) -> ClientResult<Identity> {
        self.state = SessionState::Authenticating;
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            role,
        };
        let result = self.api.login(&request).await;
        self.finish_authentication(result)
    }

    /// Start registration; the portal answers with a one-time code challenge.
    pub async fn start_registration(
        &mut self,
        request: &RegisterRequest,
    ) -> ClientResult<CodeIssued> {
        self.api.register(request).await
    }

    /// Complete registration with the one-time code. A wrong code leaves the
    /// challenge open so the caller may retry.
    pub async fn complete_registration(
        &mut self,
        challenge_id: &str,
        code: &str,
    ) -> ClientResult<Identity> {
        self.state = SessionState::Authenticating;
        let request = VerifyCode {
            challenge_id: challenge_id.to_string(),
            code: code.trim().to_string(),
        };
        let result = self.api.verify_registration(&request).await;
        self.finish_authentication(result)
    }

    /// Ask the portal who the current token belongs to. An unauthorized
    /// answer signs the session out locally.
    pub async fn refresh_identity(&mut self) -> ClientResult<Identity> {
        let token = self
            .token()
            .ok_or_else(|| ClientError::Unauthorized {
                code: "unauthorized".to_string(),
                message: "not signed in".to_string(),
            })?
            .to_string();
        match self.api.me(&token).await {
            Ok(identity) => {
                let user = serde_json::to_value(&identity).map_err(StorageError::from)?;
                self.storage.store(USER_KEY, user)?;
                self.state = SessionState::Authenticated(identity.clone());
                Ok(identity)
            }
            Err(err) if err.is_unauthorized() => {
                tracing::info!("stored session rejected by portal");
                self.reset()?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Sign out. The token is revoked server-side when possible; local state
    /// is cleared regardless.
    pub async fn logout(&mut self) -> ClientResult<()> {
        if let Some(token) = self.token.take()
            && let Err(err) = self.api.logout(&token).await
        {
            tracing::warn!(error = %err, "session revocation failed; clearing local session");
        }
        self.reset()
    }

    /// Any failure drops the previous session too, in memory and in storage.
    fn finish_authentication(
        &mut self,
        result: ClientResult<SessionGrant>,
    ) -> ClientResult<Identity> {
        let grant = match result {
            Ok(grant) => grant,
            Err(err) => {
                self.discard_after_failure();
                return Err(err);
            }
        };
        if let Err(err) = self.persist(&grant) {
            self.discard_after_failure();
            return Err(err);
        }
        tracing::info!(user_id = %grant.user.id, role = %grant.user.role, "signed in");
        self.token = Some(grant.token);
        self.state = SessionState::Authenticated(grant.user.clone());
        Ok(grant.user)
    }

    fn persist(&self, grant: &SessionGrant) -> ClientResult<()> {
        let user = serde_json::to_value(&grant.user).map_err(StorageError::from)?;
        self.storage.store(USER_KEY, user)?;
        self.storage
            .store(SESSION_TOKEN_KEY, Value::String(grant.token.clone()))?;
        Ok(())
    }

    fn discard_after_failure(&mut self) {
        if let Err(err) = self.reset() {
            tracing::warn!(error = %err, "failed to clear stored session");
        }
    }

    fn reset(&mut self) -> ClientResult<()> {
        self.token = None;
        self.state = SessionState::Unauthenticated;
        self.clear_storage()
    }

    fn clear_storage(&self) -> ClientResult<()> {
        self.storage.remove(USER_KEY)?;
        self.storage.remove(SESSION_TOKEN_KEY)?;
        Ok(())
    }
}
