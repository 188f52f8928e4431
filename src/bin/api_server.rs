// src/bin/api_server.rs

use car_registry::infra::telemetry;
use car_registry::transport;
use car_registry::{storage, Config, EntityRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init();

    tracing::info!(backend = ?config.storage, "initializing storage");
    let gateway = storage::connect(&config).await?;
    let repository = EntityRepository::new(gateway);
    if let Err(e) = repository.ping().await {
        tracing::warn!(error = %e, "storage ping failed at startup");
    }

    let app_state = transport::http::AppState::new(repository);
    let app = transport::http::create_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("API server listening on http://{}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/docs", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("shutdown signal received (Ctrl+C)");
}
