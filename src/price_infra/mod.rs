pub mod fetcher;
pub mod normalizer;
pub mod scheduler;

use async_trait::async_trait;
use crate::error::Result;

/// Decoded upstream response body, before normalization.
pub type RawPayload = serde_json::Value;

/// Upstream price quotation source polled by the scheduler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// One logical fetch, including any retries. Transport failures are
    /// returned as errors, never panics.
    async fn fetch(&self) -> Result<RawPayload>;
}
