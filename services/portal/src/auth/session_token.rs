//! Session JWT minting and verification.
//!
//! # Purpose
//! Issue EdDSA-signed bearer tokens after login or registration and verify
//! them on every authenticated request.
//!
//! # Key invariants
//! - Tokens are always EdDSA (Ed25519).
//! - `iss` and `aud` are fixed per deployment and validated on every decode.
//! - Each token carries a unique `jti` so logout can revoke it individually.
//!
//! # Concurrency model
//! [`SessionSigner`] precomputes its jsonwebtoken keys at construction and is
//! immutable afterwards; share it behind an `Arc`.
//!
//! # Security model
//! - Callers may present arbitrary strings; only tokens signed by the current
//!   key with matching issuer and audience are accepted.
//! - The signer holds private key material and must never be serialized.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use internhub_policy::{Identity, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const SESSION_ISSUER: &str = "internhub-portal";
pub const SESSION_AUDIENCE: &str = "internhub";

const ED25519_KEY_LEN: usize = 32;
const DEFAULT_LEEWAY_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Ed25519 key material for session tokens.
#[derive(Clone)]
pub struct SigningKey {
    pub kid: String,
    pub private_key: [u8; ED25519_KEY_LEN],
    pub public_key: [u8; ED25519_KEY_LEN],
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("public_key", &URL_SAFE_NO_PAD.encode(self.public_key))
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Check that the public key matches the private seed.
    pub fn validate(&self) -> Result<(), TokenError> {
        let expected = Ed25519SigningKey::from_bytes(&self.private_key)
            .verifying_key()
            .to_bytes();
        if expected != self.public_key {
            return Err(TokenError::Key(
                "Ed25519 public key does not match private seed".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("key error: {0}")]
    Key(String),
}

/// A freshly minted token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct SessionSigner {
    kid: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(key: &SigningKey) -> Result<Self, TokenError> {
        Self::with_leeway(key, DEFAULT_LEEWAY_SECS)
    }

    pub fn with_leeway(key: &SigningKey, leeway: u64) -> Result<Self, TokenError> {
        // Step 1: Refuse mismatched key material before deriving anything.
        key.validate()?;

        // Step 2: jsonwebtoken signs EdDSA from PKCS8 DER and verifies from
        // the base64url `x` component.
        let der = Ed25519SigningKey::from_bytes(&key.private_key)
            .to_pkcs8_der()
            .map_err(|err| TokenError::Key(format!("encode Ed25519 key: {err}")))?;
        let encoding = EncodingKey::from_ed_der(der.as_bytes());
        let decoding = DecodingKey::from_ed_components(&URL_SAFE_NO_PAD.encode(key.public_key))?;

        // Step 3: Fix issuer and audience checks once.
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.leeway = leeway;

        Ok(Self {
            kid: key.kid.clone(),
            encoding,
            decoding,
            validation,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn mint(&self, identity: &Identity, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let now = now_epoch_seconds();
        let claims = SessionClaims {
            iss: SESSION_ISSUER.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
            sub: identity.id.clone(),
            role: identity.role,
            exp: now + ttl.as_secs() as i64,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let header = jsonwebtoken::decode_header(token)?;
        if let Some(kid) = header.kid.as_deref()
            && kid != self.kid
        {
            return Err(TokenError::Key(format!("unknown key id {kid}")));
        }
        let decoded =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(decoded.claims)
    }

    fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(self.kid.clone());
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding)?)
    }
}

pub(crate) fn now_epoch_seconds() -> i64 {
    // Clamp to zero if the clock reads before the epoch.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
