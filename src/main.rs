use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod api;
mod config;
mod consumer;
mod db;
mod domain;
mod messaging;
mod metrics;
mod models;
mod telemetry;

use config::AppConfig;
use consumer::LoyaltyListener;
use db::PgCustomerRepository;
use domain::customer::{CustomerService, CustomerUseCase};
use messaging::RedpandaConsumer;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG overrides logger.level
    // Example: RUST_LOG=debug,rdkafka=info cargo run
    telemetry::init(&config.logger, config.server.is_development())?;

    tracing::info!(app_env = %config.server.app_env, "🚀 Starting customer loyalty service");

    // === 1. PostgreSQL ===
    let pool = db::connect(&config.postgres).await?;
    if config.postgres.run_migrations {
        db::run_migrations(&pool).await?;
    }

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Use case ===
    let repo = Arc::new(PgCustomerRepository::new(pool.clone()));
    let service: Arc<dyn CustomerService> = Arc::new(CustomerUseCase::new(repo));

    // === 4. Order events listener ===
    let source = Arc::new(RedpandaConsumer::new(&config.kafka)?);
    let listener = LoyaltyListener::new(source, service.clone()).with_metrics(metrics.clone());

    let shutdown = CancellationToken::new();
    let listener_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { listener.run(shutdown).await }
    });

    // === 5. HTTP servers ===
    let api_server = api::http_server(service, config.server.http_port)?;
    let metrics_server = metrics::metrics_server(metrics.registry().clone(), config.metrics.port)?;
    let api_handle = api_server.handle();
    let metrics_handle = metrics_server.handle();

    let mut api_task = actix_web::rt::spawn(api_server);
    let mut metrics_task = actix_web::rt::spawn(metrics_server);

    tokio::select! {
        _ = wait_for_shutdown() => tracing::info!("Shutdown signal received"),
        result = &mut api_task => tracing::error!(?result, "Customer API stopped unexpectedly"),
        result = &mut metrics_task => tracing::error!(?result, "Metrics server stopped unexpectedly"),
    }

    // === 6. Graceful shutdown ===
    shutdown.cancel();
    api_handle.stop(true).await;
    metrics_handle.stop(true).await;

    if let Err(e) = listener_task.await {
        tracing::warn!(error = %e, "Loyalty listener task ended abnormally");
    }

    pool.close().await;
    tracing::info!("👋 Customer loyalty service stopped");

    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
