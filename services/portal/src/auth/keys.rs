//! Session signing key generation.
//!
//! A fresh key per process start invalidates every outstanding session on
//! restart. Deployments that need sessions to survive a restart configure a
//! fixed hex seed instead.
use crate::auth::session_token::SigningKey;
use anyhow::{Context, Result, bail};
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub fn generate_signing_key() -> SigningKey {
    let mut private_key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut private_key);
    let mut kid_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut kid_bytes);
    build(hex::encode(kid_bytes), private_key)
}

/// Build a key from a 64-character hex seed. The `kid` is derived from the
/// public key so restarts with the same seed keep the same id.
pub fn signing_key_from_hex_seed(seed_hex: &str) -> Result<SigningKey> {
    let bytes = hex::decode(seed_hex.trim()).context("decode signing seed hex")?;
    if bytes.len() != 32 {
        bail!("signing seed must be 32 bytes, got {}", bytes.len());
    }
    let mut private_key = [0u8; 32];
    private_key.copy_from_slice(&bytes);
    let public_key = Ed25519SigningKey::from_bytes(&private_key)
        .verifying_key()
        .to_bytes();
    let kid = hex::encode(&Sha256::digest(public_key)[..8]);
    Ok(build(kid, private_key))
}

fn build(kid: String, private_key: [u8; 32]) -> SigningKey {
    let public_key = Ed25519SigningKey::from_bytes(&private_key)
        .verifying_key()
        .to_bytes();
    SigningKey {
        kid,
        private_key,
        public_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_validate() {
        let key = generate_signing_key();
        key.validate().expect("valid key");
        assert_eq!(key.kid.len(), 32);
    }

    #[test]
    fn hex_seed_is_deterministic() {
        let seed = "07".repeat(32);
        let first = signing_key_from_hex_seed(&seed).expect("first");
        let second = signing_key_from_hex_seed(&seed).expect("second");
        assert_eq!(first.kid, second.kid);
        assert_eq!(first.public_key, second.public_key);
        first.validate().expect("valid key");
    }

    #[test]
    fn short_seed_is_rejected() {
        assert!(signing_key_from_hex_seed("abcd").is_err());
        assert!(signing_key_from_hex_seed("zz").is_err());
    }
}
