use crate::auth::credentials::PasswordDigest;
use internhub_policy::Identity;

/// Stored account: the public identity plus its password digest.
///
/// Deliberately not `Serialize`; handlers return `identity` only.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub identity: Identity,
    pub password: PasswordDigest,
}

impl UserAccount {
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }
}
