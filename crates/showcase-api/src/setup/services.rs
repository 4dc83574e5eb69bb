//! Service and repository initialization

use crate::state::AppState;
use anyhow::{Context, Result};
use showcase_core::Config;
use showcase_db::{
    ContentRepository, InMemoryContentRepository, InMemoryMediaRepository, MediaRepository,
    PgContentRepository, PgMediaRepository,
};
use showcase_processing::image::ImageEncoder;
use showcase_processing::{DerivativeGenerator, FfmpegFrameExtractor};
use showcase_services::{
    CacheInvalidator, CachedContent, ContentService, InMemoryCache, MediaStore, MediaValidator,
    SitemapGenerator, Storage, UploadPolicy,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// The two repositories every service is built on.
#[derive(Clone)]
pub struct Repositories {
    pub media: Arc<dyn MediaRepository>,
    pub content: Arc<dyn ContentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            media: Arc::new(PgMediaRepository::new(pool.clone())),
            content: Arc::new(PgContentRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            media: Arc::new(InMemoryMediaRepository::new()),
            content: Arc::new(InMemoryContentRepository::new()),
        }
    }
}

/// Initialize all services and assemble the shared state.
///
/// Writes the sitemap and warms the landing snapshots before returning; both
/// are best-effort and only logged on failure.
pub async fn initialize_services(
    config: &Config,
    repositories: Repositories,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let cache = Arc::new(InMemoryCache::new(config.cache_capacity));
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    tracing::info!(
        capacity = config.cache_capacity,
        ttl_secs = config.cache_ttl_secs,
        "Content cache initialized"
    );

    let sitemap = Arc::new(SitemapGenerator::new(
        repositories.content.clone(),
        cache.clone(),
        config.public_base_url.as_str(),
        config.sitemap_path.clone(),
        ttl,
    ));
    let snapshots = Arc::new(CachedContent::new(
        repositories.media.clone(),
        repositories.content.clone(),
        storage.clone(),
        cache.clone(),
        sitemap.clone(),
        ttl,
    ));
    let invalidator = Arc::new(CacheInvalidator::new(
        cache,
        sitemap.clone(),
        snapshots.clone(),
    ));

    let frames = FfmpegFrameExtractor::new(config.media.ffmpeg_path.clone())
        .context("Invalid FFMPEG_PATH")?;
    let generator = DerivativeGenerator::new(
        storage.clone(),
        ImageEncoder::new(config.media.jpeg_quality, config.media.webp_quality),
        Arc::new(frames),
    );
    let validator = MediaValidator::new(UploadPolicy::from_config(&config.media));

    let media = Arc::new(MediaStore::new(
        repositories.media.clone(),
        repositories.content.clone(),
        storage.clone(),
        validator,
        generator,
        invalidator.clone(),
    ));
    let content = Arc::new(ContentService::new(
        repositories.content,
        media.clone(),
        invalidator.clone(),
    ));

    match sitemap.regenerate().await {
        Ok(_) => tracing::info!(path = %config.sitemap_path.display(), "Sitemap written"),
        Err(e) => tracing::warn!(error = %e, "Failed to write sitemap at startup"),
    }
    invalidator.warm().await;

    Ok(Arc::new(AppState {
        config: config.clone(),
        storage,
        media,
        content,
        snapshots,
        invalidator,
    }))
}
