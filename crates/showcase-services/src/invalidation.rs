//! Cache invalidation
//!
//! Every content mutation is described by a [`ContentChangeEvent`]. The
//! [`ContentChangeEvent::stale_keys`] match is the whole invalidation table: a
//! new event variant does not compile until it says which keys it evicts.

use showcase_core::constants::{
    CACHE_KEY_DIVISIONS_INDEX, CACHE_KEY_DIVISION_PREFIX, CACHE_KEY_HOME, CACHE_KEY_MILESTONES,
    CACHE_KEY_SETTINGS, CACHE_KEY_SITEMAP, CACHE_KEY_VISI_MISI,
};
use showcase_infra::Cache;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::sitemap::SitemapGenerator;
use crate::snapshots::CachedContent;

/// A key of the page cache namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Home,
    DivisionsIndex,
    Division(String),
    Milestones,
    Settings,
    VisiMisi,
    Sitemap,
}

impl CacheKey {
    pub fn parse(key: &str) -> Option<Self> {
        let parsed = match key {
            CACHE_KEY_HOME => CacheKey::Home,
            CACHE_KEY_DIVISIONS_INDEX => CacheKey::DivisionsIndex,
            CACHE_KEY_MILESTONES => CacheKey::Milestones,
            CACHE_KEY_SETTINGS => CacheKey::Settings,
            CACHE_KEY_VISI_MISI => CacheKey::VisiMisi,
            CACHE_KEY_SITEMAP => CacheKey::Sitemap,
            other => {
                let slug = other.strip_prefix(CACHE_KEY_DIVISION_PREFIX)?;
                if slug.is_empty() {
                    return None;
                }
                CacheKey::Division(slug.to_string())
            }
        };
        Some(parsed)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CacheKey::Home => f.write_str(CACHE_KEY_HOME),
            CacheKey::DivisionsIndex => f.write_str(CACHE_KEY_DIVISIONS_INDEX),
            CacheKey::Division(slug) => write!(f, "{}{}", CACHE_KEY_DIVISION_PREFIX, slug),
            CacheKey::Milestones => f.write_str(CACHE_KEY_MILESTONES),
            CacheKey::Settings => f.write_str(CACHE_KEY_SETTINGS),
            CacheKey::VisiMisi => f.write_str(CACHE_KEY_VISI_MISI),
            CacheKey::Sitemap => f.write_str(CACHE_KEY_SITEMAP),
        }
    }
}

/// What changed, with just enough data to name the stale keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChangeEvent {
    /// A client was created, updated or deleted.
    ClientChanged,
    SettingsUpdated,
    /// Media was stored, edited, reordered or deleted.
    MediaChanged {
        /// Slug of the owner when the owner is a division.
        division_slug: Option<String>,
        /// The home slider flag was set before or after the change.
        home_slider: bool,
    },
    DivisionCreated {
        slug: String,
    },
    DivisionUpdated {
        slug: String,
        /// Set when the update renamed the slug.
        previous_slug: Option<String>,
    },
    DivisionDeleted {
        slug: String,
    },
    /// A product, technology or machine of the division changed.
    CatalogItemChanged {
        division_slug: String,
    },
    MilestoneChanged,
}

impl ContentChangeEvent {
    pub fn stale_keys(&self) -> Vec<CacheKey> {
        match self {
            ContentChangeEvent::ClientChanged => vec![CacheKey::Home],
            ContentChangeEvent::SettingsUpdated => {
                vec![CacheKey::Home, CacheKey::Settings, CacheKey::VisiMisi]
            }
            ContentChangeEvent::MediaChanged {
                division_slug,
                home_slider,
            } => {
                let mut keys = Vec::new();
                if *home_slider {
                    keys.push(CacheKey::Home);
                }
                if let Some(slug) = division_slug {
                    keys.push(CacheKey::DivisionsIndex);
                    keys.push(CacheKey::Division(slug.clone()));
                }
                keys
            }
            ContentChangeEvent::DivisionCreated { .. } => vec![CacheKey::DivisionsIndex],
            ContentChangeEvent::DivisionUpdated {
                slug,
                previous_slug,
            } => {
                let mut keys = vec![CacheKey::DivisionsIndex, CacheKey::Division(slug.clone())];
                if let Some(previous) = previous_slug.as_ref().filter(|p| *p != slug) {
                    keys.push(CacheKey::Division(previous.clone()));
                }
                keys
            }
            ContentChangeEvent::DivisionDeleted { slug } => {
                vec![CacheKey::DivisionsIndex, CacheKey::Division(slug.clone())]
            }
            ContentChangeEvent::CatalogItemChanged { division_slug } => vec![
                CacheKey::DivisionsIndex,
                CacheKey::Division(division_slug.clone()),
            ],
            ContentChangeEvent::MilestoneChanged => vec![CacheKey::Milestones],
        }
    }

    /// Division changes alter the site structure and require a new sitemap.
    pub fn affects_site_structure(&self) -> bool {
        matches!(
            self,
            ContentChangeEvent::DivisionCreated { .. }
                | ContentChangeEvent::DivisionUpdated { .. }
                | ContentChangeEvent::DivisionDeleted { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            ContentChangeEvent::ClientChanged => "client_changed",
            ContentChangeEvent::SettingsUpdated => "settings_updated",
            ContentChangeEvent::MediaChanged { .. } => "media_changed",
            ContentChangeEvent::DivisionCreated { .. } => "division_created",
            ContentChangeEvent::DivisionUpdated { .. } => "division_updated",
            ContentChangeEvent::DivisionDeleted { .. } => "division_deleted",
            ContentChangeEvent::CatalogItemChanged { .. } => "catalog_item_changed",
            ContentChangeEvent::MilestoneChanged => "milestone_changed",
        }
    }
}

/// Evicts stale cache keys and keeps the sitemap in step with the divisions.
///
/// Never fails: the database is the source of truth, so a failed eviction or
/// sitemap write is logged and the mutation that triggered it still succeeds.
pub struct CacheInvalidator {
    cache: Arc<dyn Cache>,
    sitemap: Arc<SitemapGenerator>,
    snapshots: Arc<CachedContent>,
}

impl CacheInvalidator {
    pub fn new(
        cache: Arc<dyn Cache>,
        sitemap: Arc<SitemapGenerator>,
        snapshots: Arc<CachedContent>,
    ) -> Self {
        Self {
            cache,
            sitemap,
            snapshots,
        }
    }

    #[tracing::instrument(skip(self), fields(event = event.name()))]
    pub async fn invalidate(&self, event: &ContentChangeEvent) {
        for key in event.stale_keys() {
            let key = key.to_string();
            match self.cache.delete(&key).await {
                Ok(()) => tracing::debug!(cache_key = %key, "Cache key evicted"),
                Err(e) => tracing::warn!(
                    cache_key = %key,
                    error = %e,
                    "Failed to evict cache key"
                ),
            }
        }

        if event.affects_site_structure() {
            if let Err(e) = self.sitemap.regenerate().await {
                tracing::warn!(error = %e, "Failed to regenerate sitemap");
            }
        }
    }

    /// Rebuild the most requested snapshots so the first visitors after a
    /// flush do not all miss at once.
    pub async fn warm(&self) {
        self.snapshots.warm().await;
    }

    /// Drop every cached entry, then warm. Run after a deploy so no snapshot
    /// built by the previous release survives.
    #[tracing::instrument(skip(self))]
    pub async fn flush_and_warm(&self) {
        match self.cache.flush().await {
            Ok(()) => tracing::info!("Cache flushed"),
            Err(e) => tracing::warn!(error = %e, "Failed to flush cache"),
        }
        self.warm().await;
    }
}
