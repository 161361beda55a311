use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use chrono::Utc;
use price_tracker::config::PollerConfig;
use price_tracker::observability::metrics::{FETCH_ATTEMPT_FAILURES, SNAPSHOTS_APPENDED, STORE_RESETS, TRACKED_METRICS};
use price_tracker::price_infra::fetcher::HttpPriceFetcher;
use price_tracker::price_infra::PriceSource;
use price_tracker::store::TimeSeriesStore;
use price_tracker::types::{MarketId, MetricName, PriceRecord};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

// Each collector is touched by one test only, so exact deltas hold while
// the tests run in parallel.

fn cycle(metrics: &[&str]) -> BTreeMap<MetricName, PriceRecord> {
    metrics
        .iter()
        .map(|metric| {
            let mut record = PriceRecord::new();
            record.insert(MarketId::from("kraken"), 1.0);
            (MetricName::from(*metric), record)
        })
        .collect()
}

#[tokio::test]
async fn every_failed_attempt_is_counted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": 1})))
        .mount(&server)
        .await;
    let fetcher = HttpPriceFetcher::new(&PollerConfig {
        url: server.uri(),
        retry_backoff_ms: 0,
        ..PollerConfig::default()
    })
    .unwrap();

    let before = FETCH_ATTEMPT_FAILURES.get();
    assert!(fetcher.fetch().await.is_err());

    assert_eq!(FETCH_ATTEMPT_FAILURES.get() - before, 3);
}

#[test]
fn store_collectors_follow_appends_and_resets() {
    let store = TimeSeriesStore::new();
    let appended_before = SNAPSHOTS_APPENDED.get();
    let resets_before = STORE_RESETS.get();

    store.append_cycle(Utc::now(), cycle(&["btcusd", "ethusd"]));
    assert_eq!(TRACKED_METRICS.get(), 2);
    assert_eq!(SNAPSHOTS_APPENDED.get() - appended_before, 2);

    store.reset();
    assert_eq!(TRACKED_METRICS.get(), 0);
    assert_eq!(STORE_RESETS.get() - resets_before, 1);

    // Concurrent appends and resets must leave the gauge matching the table.
    let store = Arc::new(store);
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    store.append_cycle(Utc::now(), cycle(&["btcusd", "ethusd", "zrxbusd"]));
                }
            })
        })
        .collect();
    let resetter = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                store.reset();
            }
        })
    };
    for writer in writers {
        writer.join().unwrap();
    }
    resetter.join().unwrap();

    assert_eq!(TRACKED_METRICS.get(), store.len() as i64);
}
