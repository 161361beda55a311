use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use chrono::{DateTime, Utc};
use crate::observability::metrics::{SNAPSHOTS_APPENDED, STORE_RESETS, TRACKED_METRICS};
use crate::store::rank::{rank_series, Rank};
use crate::types::{MetricName, MetricSeries, PriceRecord, Snapshot};

type Table = HashMap<MetricName, MetricSeries>;

/// In-memory price history shared by the poller and the query handlers.
///
/// Every mutation (append, append_cycle, reset) holds the write guard and
/// every read holds the read guard, so readers see a table either before or
/// after a whole mutation.
///
/// Reset and append contend for the same guard. An append that acquired the
/// guard before a reset lands in the old table and is discarded with it; an
/// append that acquires it afterwards lands in the new, empty table. Which of
/// the two happens is decided by lock acquisition order alone.
pub struct TimeSeriesStore {
    table: RwLock<Table>,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        TimeSeriesStore {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Append one snapshot to `metric`, creating its series if absent.
    pub fn append(&self, update_time: DateTime<Utc>, metric: MetricName, record: PriceRecord) {
        let mut table = self.write();
        Self::push(&mut table, update_time, metric, record);
        TRACKED_METRICS.set(table.len() as i64);
    }

    /// Append every metric of one poll cycle under a single guard.
    ///
    /// All snapshots share `update_time`. Returns the number appended.
    pub fn append_cycle(
        &self,
        update_time: DateTime<Utc>,
        records: BTreeMap<MetricName, PriceRecord>,
    ) -> usize {
        let appended = records.len();
        let mut table = self.write();
        for (metric, record) in records {
            Self::push(&mut table, update_time, metric, record);
        }
        TRACKED_METRICS.set(table.len() as i64);
        appended
    }

    /// Discard the whole table. Returns how many metrics were dropped.
    pub fn reset(&self) -> usize {
        let old = {
            let mut table = self.write();
            TRACKED_METRICS.set(0);
            std::mem::take(&mut *table)
        };
        STORE_RESETS.inc();
        tracing::info!("Store reset, discarded {} metrics", old.len());
        old.len()
    }

    pub fn get_series(&self, metric: &str) -> Option<MetricSeries> {
        self.read().get(metric).cloned()
    }

    /// Current metric names, sorted.
    pub fn list_metrics(&self) -> Vec<MetricName> {
        let mut metrics: Vec<MetricName> = self.read().keys().cloned().collect();
        metrics.sort();
        metrics
    }

    /// Copy of every series, taken under one read guard.
    pub fn dump(&self) -> BTreeMap<MetricName, MetricSeries> {
        self.read()
            .iter()
            .map(|(metric, series)| (metric.clone(), series.clone()))
            .collect()
    }

    pub fn rank(&self, metric: &str) -> Option<Rank> {
        self.read().get(metric).map(|series| rank_series(series))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn push(table: &mut Table, update_time: DateTime<Utc>, metric: MetricName, record: PriceRecord) {
        table
            .entry(metric)
            .or_default()
            .push(Snapshot::new(update_time, record));
        SNAPSHOTS_APPENDED.inc();
    }

    // Mutations are single pushes or whole swaps, so a poisoned table is
    // still consistent and safe to keep using.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TimeSeriesStore {
    fn default() -> Self {
        Self::new()
    }
}
