use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how the HTTP server runs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built site served for every non-API path.
    pub root: PathBuf,
    /// Content directory, watched for changes when `watch` is set.
    pub source: PathBuf,
    pub open: bool,
    pub watch: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("./out"),
            source: PathBuf::from("./content"),
            open: false,
            watch: false,
        }
    }
}

/// A user allowed into the secret area.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecretUser {
    pub identifier: String,
    /// Hex SHA-256, see [`crate::passphrase::digest`].
    pub passphrase_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_secs: u64,
    pub block_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
            block_secs: 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn block(&self) -> Duration {
        Duration::from_secs(self.block_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Without it every login fails with a server error.
    pub master_password: Option<String>,
    pub session_ttl_secs: u64,
    pub failure_delay_ms: u64,
    pub secure_cookie: bool,
    pub users: Vec<SecretUser>,
    pub rate_limit: RateLimitConfig,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            master_password: None,
            session_ttl_secs: 24 * 60 * 60,
            failure_delay_ms: 1000,
            secure_cookie: true,
            users: Vec::new(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl SecretConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }

    pub fn user(&self, identifier: &str) -> Option<&SecretUser> {
        self.users.iter().find(|user| user.identifier == identifier)
    }
}
