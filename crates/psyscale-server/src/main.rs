use std::sync::Arc;

use jiff::Timestamp;
use psyscale_instruments::lookup::NormTables;
use psyscale_server::config::StorageBackend;
use psyscale_server::{AppState, ServerConfig, app, bootstrap};
use psyscale_storage::{MemoryStore, ObjectStore, S3Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn ObjectStore> = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; records are lost on exit");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::S3 { bucket } => Arc::new(S3Store::connect(bucket.clone()).await),
    };

    let norms = NormTables::load(&config.norms_dir());
    let state = AppState::new(store, norms, config.jwt(), config.lockout())?;

    let now = Timestamp::now();
    bootstrap::seed_admin(
        state.store(),
        &config.admin_email,
        config.admin_password.as_deref(),
        now,
    )
    .await?;
    let seeded = bootstrap::seed_scales(state.store(), &config.scales_dir(), now).await?;
    tracing::info!(scales = seeded, "bootstrap complete");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
