use std::collections::BTreeMap;
use serde_json::Value;
use crate::error::{Error, Result};
use crate::price_infra::RawPayload;
use crate::types::snapshot::UPDATE_TIME_FIELD;
use crate::types::{MarketId, MetricName, PriceRecord};

/// Key kind that carries per-market prices, as in `market:<market>:<metric>`.
pub const MARKET_KIND: &str = "market";

/// One combined market -> price record per metric.
pub type NormalizedPayload = BTreeMap<MetricName, PriceRecord>;

#[derive(Debug, PartialEq)]
struct MarketQuote {
    market: MarketId,
    metric: MetricName,
    price: f64,
}

/// Group the flat `result` object of a price payload by metric.
///
/// Keys of any kind other than `market` are ignored.
pub fn normalize(payload: &RawPayload) -> Result<NormalizedPayload> {
    let result = payload
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MalformedPayload("missing `result` object".to_string()))?;

    // Pass 1: keep market keys and parse them.
    let quotes = result
        .iter()
        .filter(|(key, _)| key.split(':').next() == Some(MARKET_KIND))
        .map(|(key, value)| parse_quote(key, value))
        .collect::<Result<Vec<_>>>()?;

    // Pass 2: fold into one record per metric.
    let mut grouped = NormalizedPayload::new();
    for quote in quotes {
        grouped
            .entry(quote.metric)
            .or_default()
            .insert(quote.market, quote.price);
    }

    Ok(grouped)
}

fn parse_quote(key: &str, value: &Value) -> Result<MarketQuote> {
    let segments: Vec<&str> = key.split(':').collect();
    let [_, market, metric] = segments.as_slice() else {
        return Err(Error::MalformedPayload(format!(
            "key `{}` has {} segments, expected 3",
            key,
            segments.len()
        )));
    };

    if market.is_empty() || metric.is_empty() {
        return Err(Error::MalformedPayload(format!("key `{}` has an empty segment", key)));
    }

    if *market == UPDATE_TIME_FIELD {
        return Err(Error::MalformedPayload(format!("key `{}` uses a reserved market id", key)));
    }

    let price = value
        .as_f64()
        .ok_or_else(|| Error::MalformedPayload(format!("value of `{}` is not a number: {}", key, value)))?;

    Ok(MarketQuote {
        market: MarketId::from(*market),
        metric: MetricName::from(*metric),
        price,
    })
}
