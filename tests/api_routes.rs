use std::sync::Arc;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use price_tracker::api::{create_router, ApiState, QueryService};
use price_tracker::observability::metrics;
use price_tracker::store::TimeSeriesStore;
use price_tracker::types::{MarketId, MetricName, PriceRecord};

fn record(prices: &[(&str, f64)]) -> PriceRecord {
    prices
        .iter()
        .map(|(market, price)| (MarketId::from(*market), *price))
        .collect()
}

fn app(store: &Arc<TimeSeriesStore>) -> Router {
    create_router(Arc::new(ApiState {
        query: QueryService::new(Arc::clone(store)),
    }))
}

async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn seeded_store() -> Arc<TimeSeriesStore> {
    let store = Arc::new(TimeSeriesStore::new());
    let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 0).unwrap();
    store.append(first, MetricName::from("btcusd"), record(&[("kraken", 100.0), ("bitfinex", 50.0)]));
    store.append(second, MetricName::from("btcusd"), record(&[("kraken", 104.0)]));
    store.append(first, MetricName::from("ethusd"), record(&[("kraken", 10.0)]));
    store
}

#[tokio::test]
async fn get_price_for_unknown_metric_is_false() {
    let store = Arc::new(TimeSeriesStore::new());
    let (status, body) = call(app(&store), Method::GET, "/get_price/unknownmetric").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn get_rank_for_unknown_metric_is_false() {
    let store = Arc::new(TimeSeriesStore::new());
    let (status, body) = call(app(&store), Method::GET, "/get_rank/unknownmetric").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn get_metrics_lists_names() {
    let store = seeded_store();
    let (_, body) = call(app(&store), Method::GET, "/get_metrics").await;
    assert_eq!(body, json!(["btcusd", "ethusd"]));
}

#[tokio::test]
async fn get_price_returns_flat_records_in_order() {
    let store = seeded_store();
    let (status, body) = call(app(&store), Method::GET, "/get_price/btcusd").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"update_time": "2024-05-01T12:00:00Z", "kraken": 100.0, "bitfinex": 50.0},
            {"update_time": "2024-05-01T12:01:00Z", "kraken": 104.0},
        ])
    );
}

#[tokio::test]
async fn get_rank_reports_std_dev_and_null_for_single_samples() {
    let store = seeded_store();
    let (_, body) = call(app(&store), Method::GET, "/get_rank/btcusd").await;

    let kraken = body["kraken"].as_f64().unwrap();
    assert!((kraken - 8.0f64.sqrt()).abs() < 1e-9);
    assert_eq!(body["bitfinex"], Value::Null);
}

#[tokio::test]
async fn get_data_dumps_every_series() {
    let store = seeded_store();
    let (_, body) = call(app(&store), Method::GET, "/get_data").await;

    let dump = body.as_object().unwrap();
    assert_eq!(dump.len(), 2);
    assert_eq!(dump["btcusd"].as_array().unwrap().len(), 2);
    assert_eq!(dump["ethusd"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn restart_data_returns_null_and_clears_store() {
    let store = seeded_store();

    let (status, body) = call(app(&store), Method::POST, "/restart_data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (_, metrics) = call(app(&store), Method::GET, "/get_metrics").await;
    assert_eq!(metrics, json!([]));
    let (_, price) = call(app(&store), Method::GET, "/get_price/btcusd").await;
    assert_eq!(price, json!(false));
}

#[tokio::test]
async fn restart_data_rejects_get() {
    let store = seeded_store();
    let response = app(&store)
        .oneshot(Request::builder().uri("/restart_data").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.len(), 2);
}

async fn call_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn health_answers_ok() {
    let store = Arc::new(TimeSeriesStore::new());
    let (status, body) = call_text(app(&store), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn metrics_renders_registered_collectors() {
    // the only test in this binary that registers the global collectors
    metrics::register_metrics().unwrap();
    let store = seeded_store();

    let (status, body) = call_text(app(&store), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    for name in [
        "fetch_attempt_failures_total",
        "poll_cycles_completed_total",
        "poll_cycles_skipped_total",
        "snapshots_appended_total",
        "store_resets_total",
        "tracked_metrics",
    ] {
        assert!(body.contains(&format!("# TYPE {name} ")), "{name} missing from:\n{body}");
    }
}
