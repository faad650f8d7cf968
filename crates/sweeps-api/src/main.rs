//! # sweeps-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects the store, installs
//! the Prometheus recorder and serves the API until Ctrl-C.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use sweeps_api::state::{AppConfig, AppState, EntryBackend, LogFormat};
use sweeps_entry::MemoryEntryStore;
use sweeps_integrations::{Integration, IntegrationsClient, IntegrationsConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(?config, "starting sweeps-api");

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin endpoints are unauthenticated");
    }

    let store = match config.database_url.as_deref() {
        Some(url) => {
            let pool = sweeps_api::db::init_pool(url)
                .await
                .context("database initialization failed")?;
            EntryBackend::Postgres(sweeps_api::db::PgEntryStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, running on the in-memory store. \
                 Entries will not survive restarts."
            );
            EntryBackend::Memory(MemoryEntryStore::new())
        }
    };

    let integrations_config =
        IntegrationsConfig::from_env().context("invalid integration configuration")?;
    let integrations =
        IntegrationsClient::new(integrations_config).context("integration client setup failed")?;
    for integration in Integration::ALL {
        if integrations.is_configured(integration) {
            tracing::info!(%integration, "integration configured");
        } else {
            tracing::info!(%integration, "integration not configured, skipped");
        }
    }

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let port = config.port;
    let state = AppState::new(config, store, integrations).with_metrics(prometheus);
    tracing::info!(executor = state.executor.name(), "deferred executor ready");

    let app = sweeps_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("sweeps-api listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sweeps-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
