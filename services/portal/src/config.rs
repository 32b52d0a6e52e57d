use crate::app::AuthSettings;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
pub const DEFAULT_CODE_TTL_SECS: i64 = 10 * 60;
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 5;

// Portal configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub session_ttl_secs: u64,
    pub code_ttl_secs: i64,
    pub max_code_attempts: u32,
    pub echo_codes: bool,
    /// Hex-encoded Ed25519 seed. A fresh key is generated when unset, which
    /// invalidates sessions on restart.
    pub signing_key_seed: Option<String>,
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize)]
struct PortalConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    session_ttl_secs: Option<u64>,
    code_ttl_secs: Option<i64>,
    max_code_attempts: Option<u32>,
    echo_codes: Option<bool>,
    signing_key_seed: Option<String>,
    seed_demo_data: Option<bool>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_bind: SocketAddr::from(([0, 0, 0, 0], 9090)),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            code_ttl_secs: DEFAULT_CODE_TTL_SECS,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            echo_codes: false,
            signing_key_seed: None,
            seed_demo_data: true,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(value) => parse_flag(&value).with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("INTERNHUB_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse INTERNHUB_BIND")?;
        let metrics_bind = std::env::var("INTERNHUB_METRICS_BIND")
            .unwrap_or_else(|_| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse INTERNHUB_METRICS_BIND")?;
        let config = Self {
            bind_addr,
            metrics_bind,
            session_ttl_secs: env_parse("INTERNHUB_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            code_ttl_secs: env_parse("INTERNHUB_CODE_TTL_SECS", DEFAULT_CODE_TTL_SECS)?,
            max_code_attempts: env_parse("INTERNHUB_MAX_CODE_ATTEMPTS", DEFAULT_MAX_CODE_ATTEMPTS)?,
            echo_codes: env_flag("INTERNHUB_ECHO_CODES", false)?,
            signing_key_seed: std::env::var("INTERNHUB_SIGNING_KEY_SEED")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            seed_demo_data: env_flag("INTERNHUB_SEED_DEMO_DATA", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("INTERNHUB_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read INTERNHUB_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: PortalConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse portal config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.session_ttl_secs {
            self.session_ttl_secs = value;
        }
        if let Some(value) = override_cfg.code_ttl_secs {
            self.code_ttl_secs = value;
        }
        if let Some(value) = override_cfg.max_code_attempts {
            self.max_code_attempts = value;
        }
        if let Some(value) = override_cfg.echo_codes {
            self.echo_codes = value;
        }
        if let Some(value) = override_cfg.signing_key_seed {
            self.signing_key_seed = Some(value);
        }
        if let Some(value) = override_cfg.seed_demo_data {
            self.seed_demo_data = value;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_secs == 0 {
            bail!("session_ttl_secs must be positive");
        }
        if self.code_ttl_secs <= 0 {
            bail!("code_ttl_secs must be positive");
        }
        if self.max_code_attempts == 0 {
            bail!("max_code_attempts must be positive");
        }
        Ok(())
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            session_ttl: std::time::Duration::from_secs(self.session_ttl_secs),
            code_ttl: chrono::Duration::seconds(self.code_ttl_secs),
            max_code_attempts: self.max_code_attempts,
            echo_codes: self.echo_codes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 9] = [
        "INTERNHUB_BIND",
        "INTERNHUB_METRICS_BIND",
        "INTERNHUB_SESSION_TTL_SECS",
        "INTERNHUB_CODE_TTL_SECS",
        "INTERNHUB_MAX_CODE_ATTEMPTS",
        "INTERNHUB_ECHO_CODES",
        "INTERNHUB_SIGNING_KEY_SEED",
        "INTERNHUB_SEED_DEMO_DATA",
        "INTERNHUB_CONFIG",
    ];

    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let saved = KEYS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect();
            for key in KEYS {
                unsafe {
                    std::env::remove_var(key);
                }
            }
            Self { saved }
        }

        fn set(&self, key: &'static str, value: &str) {
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, prev) in &self.saved {
                match prev {
                    Some(value) => unsafe {
                        std::env::set_var(key, value);
                    },
                    None => unsafe {
                        std::env::remove_var(key);
                    },
                }
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _guard = EnvGuard::clean();
        let config = PortalConfig::from_env().expect("config");
        assert_eq!(config.bind_addr, DEFAULT_BIND.parse().expect("bind"));
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert!(!config.echo_codes);
        assert!(config.seed_demo_data);
        assert!(config.signing_key_seed.is_none());
    }

    #[test]
    #[serial]
    fn env_overrides_are_parsed() {
        let guard = EnvGuard::clean();
        guard.set("INTERNHUB_BIND", "127.0.0.1:18080");
        guard.set("INTERNHUB_ECHO_CODES", "yes");
        guard.set("INTERNHUB_MAX_CODE_ATTEMPTS", "3");
        let config = PortalConfig::from_env().expect("config");
        assert_eq!(config.bind_addr.port(), 18080);
        assert!(config.echo_codes);
        assert_eq!(config.auth_settings().max_code_attempts, 3);
    }

    #[test]
    #[serial]
    fn invalid_values_are_rejected() {
        let guard = EnvGuard::clean();
        guard.set("INTERNHUB_ECHO_CODES", "maybe");
        assert!(PortalConfig::from_env().is_err());

        let guard = EnvGuard::clean();
        guard.set("INTERNHUB_SESSION_TTL_SECS", "0");
        let err = PortalConfig::from_env().expect_err("zero ttl");
        assert!(err.to_string().contains("session_ttl_secs"));
    }

    #[test]
    #[serial]
    fn yaml_file_overrides_env() {
        let guard = EnvGuard::clean();
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(
            file.path(),
            "bind_addr: \"127.0.0.1:19000\"\ncode_ttl_secs: 120\nseed_demo_data: false\n",
        )
        .expect("write yaml");
        guard.set("INTERNHUB_CONFIG", &file.path().display().to_string());

        let config = PortalConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr.port(), 19000);
        assert_eq!(config.code_ttl_secs, 120);
        assert!(!config.seed_demo_data);
        assert_eq!(config.auth_settings().code_ttl, chrono::Duration::seconds(120));
    }
}
