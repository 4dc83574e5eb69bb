//! Test helpers: build AppState and router for HTTP tests.
//!
//! The server runs on in-memory repositories and local storage in a temp
//! directory, so no database is needed.
//!
//! Run from workspace root: `cargo test -p showcase-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use showcase_api::setup::routes;
use showcase_api::setup::services::{initialize_services, Repositories};
use showcase_api::state::AppState;
use showcase_core::config::{MediaConfig, StorageConfig};
use showcase_core::{Config, StorageBackend};
use showcase_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const BASE_URL: &str = "https://example.com";
pub const STORAGE_BASE_URL: &str = "http://localhost:3000/storage";

/// Test application: server, shared state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub actor: Uuid,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn actor_header(&self) -> String {
        self.actor.to_string()
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: None,
        db_max_connections: 1,
        storage: StorageConfig {
            backend: StorageBackend::Local,
            local_path: Some(temp_dir.path().join("storage").display().to_string()),
            local_base_url: Some(STORAGE_BASE_URL.to_string()),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
        },
        media: MediaConfig::default(),
        public_base_url: BASE_URL.to_string(),
        sitemap_path: temp_dir.path().join("public/sitemap.xml"),
        cache_ttl_secs: 300,
        cache_capacity: 128,
        log_format: "text".to_string(),
    }
}

/// Setup test app with in-memory repositories and local storage.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);

    let storage = LocalStorage::new(
        temp_dir.path().join("storage"),
        STORAGE_BASE_URL.to_string(),
    )
    .await
    .expect("Failed to create local storage");

    let state = initialize_services(&config, Repositories::in_memory(), Arc::new(storage))
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        actor: Uuid::new_v4(),
        _temp_dir: temp_dir,
    }
}
