// Client transport defaults and environment overrides.
use crate::error::{ClientError, ClientResult};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Portal origin without the `/v1` prefix.
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `INTERNHUB_PORTAL_URL`, `INTERNHUB_CLIENT_TIMEOUT_MS` and
    /// `INTERNHUB_CLIENT_CONNECT_TIMEOUT_MS`, falling back to the defaults.
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("INTERNHUB_PORTAL_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let request_timeout =
            env_millis("INTERNHUB_CLIENT_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;
        let connect_timeout = env_millis(
            "INTERNHUB_CLIENT_CONNECT_TIMEOUT_MS",
            DEFAULT_CONNECT_TIMEOUT_MS,
        )?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "INTERNHUB_PORTAL_URL must be an http(s) URL, got {base_url:?}"
            )));
        }
        Ok(Self {
            base_url,
            request_timeout,
            connect_timeout,
        })
    }
}

fn env_millis(key: &str, default: u64) -> ClientResult<Duration> {
    let millis = match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|err| ClientError::Config(format!("parse {key}: {err}")))?,
        Err(_) => default,
    };
    if millis == 0 {
        return Err(ClientError::Config(format!("{key} must be positive")));
    }
    Ok(Duration::from_millis(millis))
}
