use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use price_tracker::api::{create_router, ApiState, QueryService};
use price_tracker::config::AppConfig;
use price_tracker::observability::{metrics, tracing::init_tracing};
use price_tracker::price_infra::fetcher::HttpPriceFetcher;
use price_tracker::price_infra::scheduler::PriceScheduler;
use price_tracker::store::TimeSeriesStore;
use price_tracker::utils::task_supervisor::TaskSupervisor;
use price_tracker::APP_NAME;

const HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("PRICE_TRACKER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    metrics::register_metrics()?;

    let store = Arc::new(TimeSeriesStore::new());

    let fetcher = HttpPriceFetcher::new(&config.poller)?;
    tracing::info!("{} polling {} every {:?}", APP_NAME, fetcher.url(), config.poller.interval());
    let scheduler = PriceScheduler::new(Box::new(fetcher), Arc::clone(&store), config.poller.interval());

    let mut supervisor = TaskSupervisor::new();
    supervisor.spawn("price_scheduler", scheduler.run());

    let state = Arc::new(ApiState {
        query: QueryService::new(store),
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .context("invalid bind address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving on http://{}", addr);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::pin!(server);

    // Queries keep being served from the existing history if the poller dies.
    let mut watching = true;
    loop {
        tokio::select! {
            res = &mut server => {
                res?;
                break;
            }
            err = supervisor.watch(HEALTH_CHECK_PERIOD), if watching => {
                tracing::error!("{}", err);
                watching = false;
            }
        }
    }

    supervisor.shutdown_all().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
