use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::AppConfig;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.cryptowat.ch/markets/prices";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    pub url: String,
    pub interval_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pause between failed attempts, capped so that all pauses of one
    /// cycle fit inside the poll interval.
    pub fn retry_backoff(&self) -> Duration {
        let configured = Duration::from_millis(self.retry_backoff_ms);
        let pauses = self.max_attempts.saturating_sub(1).max(1);
        configured.min(self.interval() / pauses)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            interval_secs: 60,
            max_attempts: 3,
            retry_backoff_ms: 500,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
