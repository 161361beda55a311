use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use crate::config::PollerConfig;
use crate::error::{Error, Result};
use crate::observability::metrics::FETCH_ATTEMPT_FAILURES;
use crate::price_infra::{PriceSource, RawPayload};

/// REST fetcher for the `markets/prices` endpoint with a bounded retry.
pub struct HttpPriceFetcher {
    client: Client,
    url: String,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl HttpPriceFetcher {
    pub fn new(config: &PollerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(HttpPriceFetcher {
            client,
            url: config.url.clone(),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn attempt(&self) -> Result<RawPayload> {
        let payload: Value = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await?
            .json()
            .await?;

        if let Some(code) = payload.get("error") {
            let reason = code.as_str().map(str::to_owned).unwrap_or_else(|| code.to_string());
            return Err(Error::Upstream(reason));
        }

        Ok(payload)
    }
}

#[async_trait]
impl PriceSource for HttpPriceFetcher {
    async fn fetch(&self) -> Result<RawPayload> {
        let mut attempt = 1;

        loop {
            match self.attempt().await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    FETCH_ATTEMPT_FAILURES.inc();

                    if attempt >= self.max_attempts {
                        tracing::error!("Fetch from {} failed after {} attempts: {}", self.url, attempt, e);
                        return Err(Error::FetchExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    tracing::warn!("Fetch attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    if !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
