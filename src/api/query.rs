use std::collections::BTreeMap;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::store::{Rank, TimeSeriesStore};
use crate::types::{MetricName, MetricSeries};

/// Read and admin operations over the shared store.
///
/// An unknown metric is an `Error::UnknownMetric` result, logged as a likely
/// caller typo; it is never a panic and never an empty series.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<TimeSeriesStore>,
}

impl QueryService {
    pub fn new(store: Arc<TimeSeriesStore>) -> Self {
        QueryService { store }
    }

    pub fn list_metrics(&self) -> Vec<MetricName> {
        self.store.list_metrics()
    }

    pub fn get_price(&self, metric: &str) -> Result<MetricSeries> {
        found(metric, self.store.get_series(metric))
    }

    pub fn get_rank(&self, metric: &str) -> Result<Rank> {
        found(metric, self.store.rank(metric))
    }

    pub fn get_data(&self) -> BTreeMap<MetricName, MetricSeries> {
        self.store.dump()
    }

    pub fn restart_data(&self) {
        self.store.reset();
    }
}

fn found<T>(metric: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| {
        tracing::error!("Unknown metric requested: {}", metric);
        Error::UnknownMetric(metric.to_string())
    })
}
