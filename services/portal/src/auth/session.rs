//! Bearer-session resolution shared by every authenticated handler.
use crate::api::error::{ApiError, api_internal, api_unauthorized};
use crate::app::AppState;
use crate::auth::session_token::SessionClaims;
use crate::store::StoreError;
use axum::http::HeaderMap;
use internhub_policy::Identity;

/// Caller resolved from a valid, unrevoked session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub claims: SessionClaims,
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

/// Verify the bearer token and load the account it names.
///
/// # Errors
/// `unauthorized` when the token is missing, malformed, expired, revoked, or
/// names an account that no longer exists or whose role changed.
pub async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing bearer token"))?;
    let claims = state.signer.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "session token rejected");
        api_unauthorized("invalid session token")
    })?;

    let revoked = state
        .store
        .is_token_revoked(&claims.jti)
        .await
        .map_err(|err| api_internal("failed to check session", &err))?;
    if revoked {
        return Err(api_unauthorized("session has been revoked"));
    }

    let account = match state.store.get_user(&claims.sub).await {
        Ok(account) => account,
        Err(StoreError::NotFound(_)) => return Err(api_unauthorized("unknown session subject")),
        Err(err) => return Err(api_internal("failed to load session user", &err)),
    };
    if account.identity.role != claims.role {
        return Err(api_unauthorized("session role no longer matches account"));
    }

    Ok(Session {
        identity: account.identity,
        claims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc"),
        );
        assert!(extract_bearer(&headers).is_none());

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }
}
