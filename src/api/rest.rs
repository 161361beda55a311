use axum::{
    Router,
    routing::{get, post},
    extract::{Path, State, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::api::query::QueryService;
use crate::error::{Error, Result};
use crate::observability::metrics;

pub struct ApiState {
    pub query: QueryService,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        .route("/restart_data", post(restart_data))
        .route("/get_metrics", get(get_metrics))
        .route("/get_price/:metric", get(get_price))
        .route("/get_rank/:metric", get(get_rank))
        .route("/get_data", get(get_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn prometheus_metrics() -> Response {
    match metrics::render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn restart_data(State(state): State<Arc<ApiState>>) -> Json<()> {
    state.query.restart_data();
    Json(())
}

async fn get_metrics(State(state): State<Arc<ApiState>>) -> Json<Vec<String>> {
    Json(state.query.list_metrics().into_iter().map(|m| m.0).collect())
}

async fn get_price(
    State(state): State<Arc<ApiState>>,
    Path(metric): Path<String>,
) -> Response {
    found_or_false(state.query.get_price(&metric))
}

async fn get_rank(
    State(state): State<Arc<ApiState>>,
    Path(metric): Path<String>,
) -> Response {
    found_or_false(state.query.get_rank(&metric))
}

async fn get_data(State(state): State<Arc<ApiState>>) -> Response {
    Json(state.query.get_data()).into_response()
}

// Unknown metrics answer `false` with status 200.
fn found_or_false<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(Error::UnknownMetric(_)) => Json(false).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: Error) -> Response {
    tracing::error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    ).into_response()
}
