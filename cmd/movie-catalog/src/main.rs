//! # Movie catalog server
//!
//! Assembles the application from configuration and compile-time features.

mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use configs::{Settings, StorageBackend};
use domains::StarScale;
use storage_adapters::InMemoryCatalog;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    logging::init(&settings.log)?;
    tracing::debug!(
        config_file = ?std::env::var(configs::CONFIG_PATH_VAR).ok(),
        "settings loaded"
    );

    let scale = StarScale::new(settings.ratings.star_values.iter().copied())
        .context("invalid ratings.star_values")?;

    let state = match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, data is lost on restart");
            AppState::new(Arc::new(InMemoryCatalog::new()), scale)
        }
        StorageBackend::Postgres => postgres_state(&settings, scale).await?,
    };

    let addr = settings.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, backend = ?settings.storage.backend, "movie catalog listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("shut down");
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn postgres_state(settings: &Settings, scale: StarScale) -> anyhow::Result<AppState> {
    let url = settings
        .database
        .url()
        .context("database.url is required for the postgres backend")?;
    let catalog =
        storage_adapters::PgCatalog::connect(url, settings.database.max_connections).await?;
    catalog.migrate().await?;
    catalog.sync_star_scale(&scale).await?;
    Ok(AppState::new(Arc::new(catalog), scale))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_state(_settings: &Settings, _scale: StarScale) -> anyhow::Result<AppState> {
    anyhow::bail!("this build does not include the db-postgres feature")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
