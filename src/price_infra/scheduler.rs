use std::sync::Arc;
use chrono::Utc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::Instrument;
use crate::observability::metrics::{CYCLES_COMPLETED, CYCLES_SKIPPED};
use crate::observability::tracing::trace_poll_cycle;
use crate::price_infra::normalizer::normalize;
use crate::price_infra::PriceSource;
use crate::store::TimeSeriesStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Appended { metrics: usize },
    Skipped,
}

/// Drives fetch -> normalize -> append on a fixed interval.
pub struct PriceScheduler {
    source: Box<dyn PriceSource>,
    store: Arc<TimeSeriesStore>,
    interval: Duration,
    cycles: u64,
}

impl PriceScheduler {
    pub fn new(source: Box<dyn PriceSource>, store: Arc<TimeSeriesStore>, interval: Duration) -> Self {
        PriceScheduler {
            source,
            store,
            interval,
            cycles: 0,
        }
    }

    /// Poll until the task is aborted. The first cycle fires one interval
    /// after start; cycles run back to back on this task and never overlap.
    pub async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Price scheduler started, polling every {:?}", self.interval);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One fetch -> normalize -> append pass. Failures skip the cycle and
    /// leave the store untouched.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        let span = trace_poll_cycle(self.cycles);
        Self::cycle(self.source.as_ref(), &self.store).instrument(span).await
    }

    async fn cycle(source: &dyn PriceSource, store: &TimeSeriesStore) -> CycleOutcome {
        let update_time = Utc::now();

        let payload = match source.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Skipping cycle, fetch failed: {}", e);
                CYCLES_SKIPPED.inc();
                return CycleOutcome::Skipped;
            }
        };

        let records = match normalize(&payload) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Skipping cycle, payload rejected: {}", e);
                CYCLES_SKIPPED.inc();
                return CycleOutcome::Skipped;
            }
        };

        let metrics = store.append_cycle(update_time, records);
        CYCLES_COMPLETED.inc();
        tracing::info!("Cycle appended {} metrics", metrics);

        CycleOutcome::Appended { metrics }
    }
}
