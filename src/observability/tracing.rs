use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("tracing init failed: {}", e)))
}

pub fn trace_poll_cycle(cycle: u64) -> Span {
    tracing::info_span!(
        "poll_cycle",
        cycle = cycle,
    )
}
