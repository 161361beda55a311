use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Fetch Errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream reported an error: {0}")]
    Upstream(String),

    #[error("Fetch failed after {attempts} attempts: {last}")]
    FetchExhausted {
        attempts: u32,
        last: Box<Error>,
    },

    // Normalization Errors
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // Query Errors
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Error::Metrics(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
