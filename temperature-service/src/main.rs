use anyhow::Context;
use axum::{http::StatusCode, response::IntoResponse, response::Response, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use temperature_service::api::TemperatureApi;
use temperature_service::config::Config;
use temperature_service::db::{self, PgStore};
use temperature_service::{metrics, rest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Config::from_env()).await {
        error!("Temperature service failed: {:#}", e);
        std::process::exit(1);
    }

    info!("Shutting down");
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting Temperature Service");
    info!("HTTP server: {}", config.http_addr);
    info!("Database: {}", config.redacted_database_url());

    metrics::init_metrics().context("Failed to register metrics")?;

    let pool = db::make_pool(&config)
        .await
        .context("Failed to connect to database")?;

    let api = TemperatureApi::new(Arc::new(PgStore::new(pool)));

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .merge(rest::create_router(api));

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.http_addr))?;

    info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A signal that fails to register never resolves.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}
