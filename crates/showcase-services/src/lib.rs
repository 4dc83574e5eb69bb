//! Showcase Services Layer
//!
//! Business orchestration for the site backend: the media ingestion pipeline,
//! content mutations, cache invalidation and the SEO artifacts. Handlers in
//! showcase-api stay thin and call into these services.

pub mod content;
pub mod invalidation;
pub mod media_store;
pub mod sitemap;
pub mod snapshots;

pub use content::ContentService;
pub use invalidation::{CacheInvalidator, CacheKey, ContentChangeEvent};
pub use media_store::{MediaInput, MediaStore, MediaStoreError, StoreMediaRequest};
pub use sitemap::{robots_txt, SitemapGenerator};
pub use snapshots::CachedContent;

pub use showcase_infra::{Cache, CacheError, InMemoryCache};
pub use showcase_processing::{IncomingFile, MediaValidator, UploadPolicy};
pub use showcase_storage::{create_storage, Storage, StorageError};
