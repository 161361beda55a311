pub mod ids;
pub mod snapshot;

pub use ids::{MarketId, MetricName};
pub use snapshot::{MetricSeries, PriceRecord, Snapshot};
