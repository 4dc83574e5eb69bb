//! Public content snapshots
//!
//! Each cache key maps to one JSON document assembled from the repositories.
//! Reads go through the cache; a cache that is down only costs a rebuild.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use showcase_core::models::{CatalogKind, Media, MediaKind, MediaOwner};
use showcase_core::AppError;
use showcase_db::{ContentRepository, MediaRepository};
use showcase_infra::Cache;
use showcase_processing::derivatives::{planned_widths, thumbnail_key, variant_key, webp_key};
use showcase_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::invalidation::CacheKey;
use crate::sitemap::SitemapGenerator;

/// Public view of a media item with resolved URLs.
///
/// `srcset` lists the responsive widths an image of this size gets; a missing
/// derivative falls back to `url` on the client.
#[derive(Debug, Serialize)]
pub struct MediaView {
    pub id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub srcset: Vec<SrcsetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub caption: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_featured: bool,
}

#[derive(Debug, Serialize)]
pub struct SrcsetEntry {
    pub width: u32,
    pub url: String,
}

impl MediaView {
    pub fn new(media: &Media, storage: &dyn Storage) -> Self {
        let Some(key) = media.storage_key() else {
            return Self {
                id: media.id,
                kind: media.kind,
                url: media.path_or_embed.clone(),
                external: true,
                webp_url: None,
                srcset: Vec::new(),
                thumbnail_url: None,
                caption: media.caption.clone(),
                width: None,
                height: None,
                is_featured: media.is_featured,
            };
        };

        let (webp_url, srcset, thumbnail_url) = match media.kind {
            MediaKind::Image => (
                Some(storage.url(&webp_key(key))),
                planned_widths(media.width.unwrap_or(0))
                    .into_iter()
                    .map(|width| SrcsetEntry {
                        width,
                        url: storage.url(&variant_key(key, width)),
                    })
                    .collect(),
                None,
            ),
            MediaKind::Video => (None, Vec::new(), Some(storage.url(&thumbnail_key(key)))),
        };

        Self {
            id: media.id,
            kind: media.kind,
            url: storage.url(key),
            external: false,
            webp_url,
            srcset,
            thumbnail_url,
            caption: media.caption.clone(),
            width: media.width,
            height: media.height,
            is_featured: media.is_featured,
        }
    }
}

/// Read-through access to the cached page snapshots.
pub struct CachedContent {
    media: Arc<dyn MediaRepository>,
    content: Arc<dyn ContentRepository>,
    storage: Arc<dyn Storage>,
    cache: Arc<dyn Cache>,
    sitemap: Arc<SitemapGenerator>,
    ttl: Duration,
}

impl CachedContent {
    pub fn new(
        media: Arc<dyn MediaRepository>,
        content: Arc<dyn ContentRepository>,
        storage: Arc<dyn Storage>,
        cache: Arc<dyn Cache>,
        sitemap: Arc<SitemapGenerator>,
        ttl: Duration,
    ) -> Self {
        Self {
            media,
            content,
            storage,
            cache,
            sitemap,
            ttl,
        }
    }

    /// Cached value for `key`, building and caching it on a miss.
    /// `NotFound` when the key names a division that does not exist.
    #[tracing::instrument(skip(self), fields(cache_key = %key))]
    pub async fn get(&self, key: &CacheKey) -> Result<String, AppError> {
        let cache_key = key.to_string();
        match self.cache.get(&cache_key).await {
            Ok(Some(value)) => {
                tracing::debug!("Cache hit");
                return Ok(value);
            }
            Ok(None) => tracing::debug!("Cache miss"),
            Err(e) => tracing::warn!(error = %e, "Cache read failed, building directly"),
        }

        let value = self.build(key).await?;
        if let Err(e) = self.cache.set(&cache_key, value.clone(), self.ttl).await {
            tracing::warn!(error = %e, "Failed to store snapshot in cache");
        }
        Ok(value)
    }

    /// Rebuild and store `home:v1` and `divisions:index`.
    pub async fn warm(&self) {
        for key in [CacheKey::Home, CacheKey::DivisionsIndex] {
            let cache_key = key.to_string();
            let value = match self.build(&key).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(cache_key = %cache_key, error = %e, "Failed to build snapshot for warming");
                    continue;
                }
            };
            match self.cache.set(&cache_key, value, self.ttl).await {
                Ok(()) => tracing::info!(cache_key = %cache_key, "Cache warmed"),
                Err(e) => tracing::warn!(cache_key = %cache_key, error = %e, "Failed to warm cache key"),
            }
        }
    }

    /// Serialized snapshot for `key`, straight from the repositories.
    pub async fn build(&self, key: &CacheKey) -> Result<String, AppError> {
        let document = match key {
            CacheKey::Home => self.home().await?,
            CacheKey::DivisionsIndex => self.divisions_index().await?,
            CacheKey::Division(slug) => self.division(slug).await?,
            CacheKey::Milestones => {
                let milestones = self.content.list_milestones().await?;
                json!({ "milestones": milestones })
            }
            CacheKey::Settings => self.settings().await?,
            CacheKey::VisiMisi => {
                let settings = self.content.get_settings().await?;
                json!({
                    "vision": settings.vision(),
                    "mission": settings.mission(),
                })
            }
            CacheKey::Sitemap => return self.sitemap.build().await,
        };
        serde_json::to_string(&document)
            .map_err(|e| AppError::Internal(format!("Failed to serialize snapshot: {}", e)))
    }

    async fn home(&self) -> Result<JsonValue, AppError> {
        let settings = self.content.get_settings().await?;
        let slider = self.media_views(self.media.list_home_slider().await?);
        let clients = self.content.list_clients().await?;

        let clients: Vec<JsonValue> = clients
            .into_iter()
            .map(|client| {
                json!({
                    "id": client.id,
                    "name": client.name,
                    "website": client.website,
                })
            })
            .collect();

        Ok(json!({
            "site_name": settings.site_name(),
            "tagline": settings.tagline(),
            "meta_title": settings.meta_title(),
            "meta_description": settings.meta_description(),
            "slider": slider,
            "clients": clients,
        }))
    }

    async fn divisions_index(&self) -> Result<JsonValue, AppError> {
        let divisions = self.content.list_divisions().await?;
        let mut entries = Vec::with_capacity(divisions.len());
        for division in divisions {
            let cover = self
                .media
                .list_by_owner(&MediaOwner::Division(division.id))
                .await?
                .into_iter()
                .find(|m| m.kind == MediaKind::Image)
                .map(|m| MediaView::new(&m, self.storage.as_ref()));
            entries.push(json!({
                "id": division.id,
                "name": division.name,
                "slug": division.slug,
                "summary": division.summary,
                "cover": cover,
            }));
        }
        Ok(json!({ "divisions": entries }))
    }

    async fn division(&self, slug: &str) -> Result<JsonValue, AppError> {
        let division = self
            .content
            .get_division_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Division '{}' not found", slug)))?;

        let media = self.media_views(
            self.media
                .list_by_owner(&MediaOwner::Division(division.id))
                .await?,
        );
        let items = self.content.list_catalog_items(division.id, None).await?;

        let group = |kind: CatalogKind| -> Vec<JsonValue> {
            items
                .iter()
                .filter(|item| item.kind == kind)
                .map(|item| {
                    json!({
                        "id": item.id,
                        "name": item.name,
                        "description": item.description,
                    })
                })
                .collect()
        };

        Ok(json!({
            "division": division,
            "media": media,
            "products": group(CatalogKind::Product),
            "technologies": group(CatalogKind::Technology),
            "machines": group(CatalogKind::Machine),
        }))
    }

    async fn settings(&self) -> Result<JsonValue, AppError> {
        let settings = self.content.get_settings().await?;
        let mut document = settings.to_json_value();
        if let Some(fields) = document.as_object_mut() {
            fields.insert("site_name".to_string(), json!(settings.site_name()));
            fields.insert("tagline".to_string(), json!(settings.tagline()));
            fields.insert("meta_title".to_string(), json!(settings.meta_title()));
            fields.insert(
                "meta_description".to_string(),
                json!(settings.meta_description()),
            );
        }
        Ok(document)
    }

    fn media_views(&self, media: Vec<Media>) -> Vec<MediaView> {
        media
            .iter()
            .map(|m| MediaView::new(m, self.storage.as_ref()))
            .collect()
    }
}
