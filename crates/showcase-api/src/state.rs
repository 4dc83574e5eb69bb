//! Application state shared by all handlers.

use showcase_core::Config;
use showcase_services::{CacheInvalidator, CachedContent, ContentService, MediaStore, Storage};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub media: Arc<MediaStore>,
    pub content: Arc<ContentService>,
    pub snapshots: Arc<CachedContent>,
    pub invalidator: Arc<CacheInvalidator>,
}
