use std::collections::BTreeMap;
use crate::types::{MarketId, Snapshot};

/// Per-market dispersion of a metric's price history.
///
/// `None` marks a market with fewer than two observations, where the sample
/// standard deviation is undefined. Serializes as JSON `null`.
pub type Rank = BTreeMap<MarketId, Option<f64>>;

/// Sample standard deviation (n - 1 denominator) of each market column.
///
/// A market missing from a snapshot is a missing observation for that cycle,
/// not a zero price.
pub fn rank_series(series: &[Snapshot]) -> Rank {
    let mut columns: BTreeMap<&MarketId, Vec<f64>> = BTreeMap::new();
    for snapshot in series {
        for (market, price) in &snapshot.prices {
            columns.entry(market).or_default().push(*price);
        }
    }

    columns
        .into_iter()
        .map(|(market, values)| (market.clone(), sample_std_dev(&values)))
        .collect()
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

    Some((sum_sq / (n - 1.0)).sqrt())
}
