//! Password digests for portal accounts.
//!
//! # Key invariants
//! - Every digest carries its own random 16-byte salt.
//! - Plain passwords never leave the request handler; only digests are stored.
//!
//! # Security model
//! Salted SHA-256 keeps identical passwords from producing identical digests
//! and comparison runs over every byte regardless of where a mismatch occurs.
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Shared credential of the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "password";

pub const MIN_PASSWORD_LEN: usize = 6;

const SALT_LEN: usize = 16;

#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: [u8; SALT_LEN],
    hash: [u8; 32],
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("salt", &hex::encode(self.salt))
            .field("hash", &"<redacted>")
            .finish()
    }
}

pub fn hash_password(password: &str) -> PasswordDigest {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    PasswordDigest {
        salt,
        hash: digest(&salt, password),
    }
}

impl PasswordDigest {
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(&self.salt, password);
        candidate
            .iter()
            .zip(self.hash.iter())
            .fold(0u8, |acc, (left, right)| acc | (left ^ right))
            == 0
    }
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_original_password_only() {
        let digest = hash_password(DEMO_PASSWORD);
        assert!(digest.verify("password"));
        assert!(!digest.verify("Password"));
        assert!(!digest.verify(""));
    }

    #[test]
    fn salts_differ_between_digests() {
        let first = hash_password("secret");
        let second = hash_password("secret");
        assert_ne!(first, second);
        assert!(first.verify("secret"));
        assert!(second.verify("secret"));
    }

    #[test]
    fn debug_output_hides_hash() {
        let rendered = format!("{:?}", hash_password("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
