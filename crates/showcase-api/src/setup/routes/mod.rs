//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::constants::MULTIPART_OVERHEAD_BYTES;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use showcase_core::{Config, StorageBackend};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const DEFAULT_STORAGE_MOUNT: &str = "/storage";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .merge(domains::site_routes(state.clone()))
        .merge(domains::media_routes(state.clone()))
        .merge(domains::division_routes(state.clone()))
        .merge(domains::company_routes(state.clone()));

    if config.storage.backend == StorageBackend::Local {
        if let Some(local_path) = config.storage.local_path.as_deref() {
            let mount = storage_mount(config.storage.local_base_url.as_deref());
            tracing::info!(mount = %mount, path = %local_path, "Serving local media files");
            app = app.nest_service(&mount, ServeDir::new(local_path));
        }
    }

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let max_upload = config
        .media
        .video_max_file_size_bytes
        .max(config.media.image_max_file_size_bytes) as usize;

    let app = app
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(max_upload + MULTIPART_OVERHEAD_BYTES))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// URL path the local backend's public URLs point at, e.g. `/storage` for
/// `http://localhost:3000/storage`.
fn storage_mount(base_url: Option<&str>) -> String {
    let path = base_url
        .and_then(|url| url.split_once("://").map(|(_, rest)| rest))
        .and_then(|rest| rest.find('/').map(|i| &rest[i..]))
        .map(|path| path.trim_end_matches('/'))
        .unwrap_or_default();

    if path.is_empty() {
        DEFAULT_STORAGE_MOUNT.to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_mount_from_base_url() {
        assert_eq!(storage_mount(Some("http://localhost:3000/storage")), "/storage");
        assert_eq!(storage_mount(Some("https://cdn.example.com/media/files/")), "/media/files");
        assert_eq!(storage_mount(Some("https://cdn.example.com")), "/storage");
        assert_eq!(storage_mount(None), "/storage");
    }
}
