//! Application setup and initialization
//!
//! Everything `main` needs to turn a [`Config`] into a running router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use showcase_core::Config;
use std::sync::Arc;

use services::Repositories;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    showcase_infra::init_telemetry(config.log_json())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let repositories = match database::setup_database(&config).await? {
        Some(pool) => Repositories::postgres(pool),
        None => {
            tracing::warn!("DATABASE_URL not set; content is kept in memory and lost on restart");
            Repositories::in_memory()
        }
    };

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, repositories, storage).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
