use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Poller metrics
    pub static ref FETCH_ATTEMPT_FAILURES: IntCounter = IntCounter::new(
        "fetch_attempt_failures_total",
        "Total number of failed upstream fetch attempts"
    ).expect("valid metric definition");

    pub static ref CYCLES_COMPLETED: IntCounter = IntCounter::new(
        "poll_cycles_completed_total",
        "Total number of poll cycles that appended data"
    ).expect("valid metric definition");

    pub static ref CYCLES_SKIPPED: IntCounter = IntCounter::new(
        "poll_cycles_skipped_total",
        "Total number of poll cycles dropped after a fetch or payload failure"
    ).expect("valid metric definition");

    // Store metrics
    pub static ref SNAPSHOTS_APPENDED: IntCounter = IntCounter::new(
        "snapshots_appended_total",
        "Total number of snapshots appended to the store"
    ).expect("valid metric definition");

    pub static ref STORE_RESETS: IntCounter = IntCounter::new(
        "store_resets_total",
        "Total number of store resets"
    ).expect("valid metric definition");

    pub static ref TRACKED_METRICS: IntGauge = IntGauge::new(
        "tracked_metrics",
        "Number of metrics currently held in the store"
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(FETCH_ATTEMPT_FAILURES.clone()))?;
    REGISTRY.register(Box::new(CYCLES_COMPLETED.clone()))?;
    REGISTRY.register(Box::new(CYCLES_SKIPPED.clone()))?;
    REGISTRY.register(Box::new(SNAPSHOTS_APPENDED.clone()))?;
    REGISTRY.register(Box::new(STORE_RESETS.clone()))?;
    REGISTRY.register(Box::new(TRACKED_METRICS.clone()))?;
    Ok(())
}

/// Render the registry in the Prometheus text exposition format.
pub fn render() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| crate::error::Error::Metrics(e.to_string()))
}
