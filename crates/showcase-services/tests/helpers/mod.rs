//! Test helpers: wire the service layer against in-memory repositories, an
//! in-memory cache and local storage in a temp directory.
//!
//! Run from workspace root: `cargo test -p showcase-services`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use showcase_core::models::{
    DivisionInput, Media, MediaOwner, MediaUpdate, NewMedia, UploadContext,
};
use showcase_core::AppError;
use showcase_db::{InMemoryContentRepository, InMemoryMediaRepository, MediaRepository};
use showcase_processing::derivatives::is_webp;
use showcase_processing::image::ImageEncoder;
use showcase_processing::{DerivativeError, DerivativeGenerator, FrameExtractor};
use showcase_services::{
    CacheInvalidator, CachedContent, ContentService, IncomingFile, InMemoryCache, MediaInput,
    MediaStore, MediaValidator, SitemapGenerator, Storage, StoreMediaRequest,
};
use showcase_storage::{LocalStorage, StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const BASE_URL: &str = "https://example.com";

/// Local storage that counts every write and delete, and can be told to fail
/// some of them.
pub struct CountingStorage {
    inner: LocalStorage,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_original_puts: AtomicBool,
    fail_derivative_puts: AtomicBool,
    fail_derivative_deletes: AtomicBool,
    fail_original_deletes: AtomicBool,
}

/// Stored originals are bare hex tokens; derivatives carry a `_` suffix or
/// are WebP transcodes (test uploads are never WebP themselves).
fn is_derivative_key(key: &str) -> bool {
    let file = key.rsplit('/').next().unwrap_or(key);
    file.contains('_') || is_webp(key)
}

impl CountingStorage {
    pub fn fail_original_puts(&self) {
        self.fail_original_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_derivative_puts(&self) {
        self.fail_derivative_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_derivative_deletes(&self) {
        self.fail_derivative_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_original_deletes(&self) {
        self.fail_original_deletes.store(true, Ordering::SeqCst);
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn operations(&self) -> usize {
        self.puts() + self.deletes()
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let failing = if is_derivative_key(key) {
            &self.fail_derivative_puts
        } else {
            &self.fail_original_puts
        };
        if failing.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(format!("injected failure for {}", key)));
        }
        self.inner.put(key, content_type, data).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let failing = if is_derivative_key(key) {
            &self.fail_derivative_deletes
        } else {
            &self.fail_original_deletes
        };
        if failing.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(format!("injected failure for {}", key)));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn url(&self, key: &str) -> String {
        self.inner.url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// In-memory media rows whose inserts can be switched to fail.
pub struct FlakyMediaRepository {
    inner: Arc<InMemoryMediaRepository>,
    fail_inserts: AtomicBool,
}

impl FlakyMediaRepository {
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaRepository for FlakyMediaRepository {
    async fn insert(&self, media: NewMedia) -> Result<Media, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected insert failure".to_string()));
        }
        self.inner.insert(media).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        self.inner.get(id).await
    }

    async fn list_by_owner(&self, owner: &MediaOwner) -> Result<Vec<Media>, AppError> {
        self.inner.list_by_owner(owner).await
    }

    async fn list_home_slider(&self) -> Result<Vec<Media>, AppError> {
        self.inner.list_home_slider().await
    }

    async fn max_order(&self, owner: &MediaOwner) -> Result<Option<i32>, AppError> {
        self.inner.max_order(owner).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: &MediaUpdate,
    ) -> Result<Option<Media>, AppError> {
        self.inner.update_details(id, update).await
    }

    async fn apply_order(&self, owner: &MediaOwner, orders: &[(Uuid, i32)]) -> Result<(), AppError> {
        self.inner.apply_order(owner, orders).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.delete(id).await
    }
}

/// Returns a tiny JPEG instead of running ffmpeg.
pub struct StaticFrame;

#[async_trait]
impl FrameExtractor for StaticFrame {
    async fn extract_frame(&self, _video: &[u8]) -> Result<Vec<u8>, DerivativeError> {
        Ok(fixtures::jpeg(32, 18))
    }
}

/// The full service stack.
pub struct TestStack {
    pub media_repo: Arc<InMemoryMediaRepository>,
    /// The repository `media` writes through; wraps `media_repo`.
    pub flaky_media_repo: Arc<FlakyMediaRepository>,
    pub content_repo: Arc<InMemoryContentRepository>,
    pub storage: Arc<CountingStorage>,
    pub cache: Arc<InMemoryCache>,
    pub sitemap: Arc<SitemapGenerator>,
    pub snapshots: Arc<CachedContent>,
    pub invalidator: Arc<CacheInvalidator>,
    pub media: Arc<MediaStore>,
    pub content: ContentService,
    pub actor: Uuid,
    pub _temp_dir: TempDir,
}

pub async fn setup() -> TestStack {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let inner = LocalStorage::new(
        temp_dir.path().join("storage"),
        "http://localhost:3000/storage".to_string(),
    )
    .await
    .expect("Failed to create local storage");
    let storage = Arc::new(CountingStorage {
        inner,
        puts: AtomicUsize::new(0),
        deletes: AtomicUsize::new(0),
        fail_original_puts: AtomicBool::new(false),
        fail_derivative_puts: AtomicBool::new(false),
        fail_derivative_deletes: AtomicBool::new(false),
        fail_original_deletes: AtomicBool::new(false),
    });

    let media_repo = Arc::new(InMemoryMediaRepository::new());
    let flaky_media_repo = Arc::new(FlakyMediaRepository {
        inner: media_repo.clone(),
        fail_inserts: AtomicBool::new(false),
    });
    let content_repo = Arc::new(InMemoryContentRepository::new());
    let cache = Arc::new(InMemoryCache::new(128));
    let ttl = Duration::from_secs(300);

    let sitemap = Arc::new(SitemapGenerator::new(
        content_repo.clone(),
        cache.clone(),
        BASE_URL,
        temp_dir.path().join("public/sitemap.xml"),
        ttl,
    ));
    let snapshots = Arc::new(CachedContent::new(
        media_repo.clone(),
        content_repo.clone(),
        storage.clone(),
        cache.clone(),
        sitemap.clone(),
        ttl,
    ));
    let invalidator = Arc::new(CacheInvalidator::new(
        cache.clone(),
        sitemap.clone(),
        snapshots.clone(),
    ));
    let generator = DerivativeGenerator::new(
        storage.clone(),
        ImageEncoder::default(),
        Arc::new(StaticFrame),
    );
    let media = Arc::new(MediaStore::new(
        flaky_media_repo.clone(),
        content_repo.clone(),
        storage.clone(),
        MediaValidator::default(),
        generator,
        invalidator.clone(),
    ));
    let content = ContentService::new(content_repo.clone(), media.clone(), invalidator.clone());

    TestStack {
        media_repo,
        flaky_media_repo,
        content_repo,
        storage,
        cache,
        sitemap,
        snapshots,
        invalidator,
        media,
        content,
        actor: Uuid::new_v4(),
        _temp_dir: temp_dir,
    }
}

impl TestStack {
    pub async fn division(&self, name: &str) -> MediaOwner {
        let division = self
            .content
            .create_division(DivisionInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create division");
        MediaOwner::Division(division.id)
    }

    pub fn upload(&self, owner: MediaOwner, file: IncomingFile, context: UploadContext) -> StoreMediaRequest {
        StoreMediaRequest {
            owner,
            input: MediaInput::File(file),
            context,
            caption: None,
            is_home_slider: false,
            is_featured: false,
            actor: self.actor,
        }
    }

    pub fn video_url(&self, owner: MediaOwner, url: &str) -> StoreMediaRequest {
        StoreMediaRequest {
            owner,
            input: MediaInput::VideoUrl(url.to_string()),
            context: UploadContext::General,
            caption: None,
            is_home_slider: false,
            is_featured: false,
            actor: self.actor,
        }
    }

    /// Every blob currently in storage.
    pub async fn blobs(&self) -> Vec<String> {
        self.storage.list("media").await.expect("Failed to list storage")
    }
}
