use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::ids::MarketId;

/// Field name of the cycle timestamp in a serialized snapshot. No market may
/// share it, since market prices are flattened next to it.
pub const UPDATE_TIME_FIELD: &str = "update_time";

/// Prices reported for one metric in one cycle, keyed by market.
pub type PriceRecord = BTreeMap<MarketId, f64>;

/// One poll cycle's prices for one metric.
///
/// Serializes flat: `{"update_time": "...", "<market>": <price>, ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub update_time: DateTime<Utc>,
    #[serde(flatten)]
    pub prices: PriceRecord,
}

impl Snapshot {
    pub fn new(update_time: DateTime<Utc>, prices: PriceRecord) -> Self {
        Snapshot { update_time, prices }
    }

    pub fn price(&self, market: &str) -> Option<f64> {
        self.prices.get(market).copied()
    }
}

/// Snapshots of one metric in append order.
pub type MetricSeries = Vec<Snapshot>;
