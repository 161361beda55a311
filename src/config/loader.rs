use crate::config::{LoggingConfig, PollerConfig, ServerConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub poller: PollerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layered load: defaults, `config/default`, `config/<env>`, then
    /// `PRICE_TRACKER__SECTION__KEY` environment variables.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PRICE_TRACKER").separator("__"))
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_secs == 0 {
            return Err(Error::ConfigError("poller.interval_secs must be positive".into()));
        }
        if self.poller.max_attempts == 0 {
            return Err(Error::ConfigError("poller.max_attempts must be positive".into()));
        }
        if self.poller.url.trim().is_empty() {
            return Err(Error::ConfigError("poller.url must not be empty".into()));
        }
        Ok(())
    }
}
