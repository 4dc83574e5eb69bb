//! Media ingestion and removal
//!
//! Store: validate, write the original, generate derivatives (best effort),
//! append the row. Delete: remove the row first, then the blobs, so a row
//! never points at a missing original.

use chrono::Utc;
use showcase_core::models::{
    Media, MediaKind, MediaOwner, MediaUpdate, NewMedia, UploadContext,
};
use showcase_core::AppError;
use showcase_db::{ContentRepository, MediaRepository};
use showcase_processing::derivatives::derivative_keys;
use showcase_processing::{
    DerivativeGenerator, IncomingFile, MediaValidationError, MediaValidator, PartialFailure,
};
use showcase_storage::{media_key, FileNamer, Storage, StorageError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::invalidation::{CacheInvalidator, ContentChangeEvent};

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error(transparent)]
    Validation(#[from] MediaValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0} not found")]
    OwnerNotFound(MediaOwner),

    #[error("Media {0} not found")]
    NotFound(Uuid),

    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<MediaStoreError> for AppError {
    fn from(err: MediaStoreError) -> Self {
        match err {
            MediaStoreError::Validation(e) => e.into(),
            MediaStoreError::Storage(e) => AppError::Storage(e.to_string()),
            MediaStoreError::OwnerNotFound(owner) => {
                AppError::NotFound(format!("Owner {} not found", owner))
            }
            MediaStoreError::NotFound(id) => AppError::NotFound(format!("Media {} not found", id)),
            MediaStoreError::InvalidReorder(msg) => AppError::InvalidInput(msg),
            MediaStoreError::Repository(e) => e,
        }
    }
}

/// Uploaded bytes or an external video link.
#[derive(Debug, Clone)]
pub enum MediaInput {
    File(IncomingFile),
    VideoUrl(String),
}

#[derive(Debug, Clone)]
pub struct StoreMediaRequest {
    pub owner: MediaOwner,
    pub input: MediaInput,
    pub context: UploadContext,
    /// Defaults to the original filename for uploads.
    pub caption: Option<String>,
    pub is_home_slider: bool,
    pub is_featured: bool,
    pub actor: Uuid,
}

pub struct MediaStore {
    media: Arc<dyn MediaRepository>,
    content: Arc<dyn ContentRepository>,
    storage: Arc<dyn Storage>,
    validator: MediaValidator,
    generator: DerivativeGenerator,
    namer: FileNamer,
    invalidator: Arc<CacheInvalidator>,
}

impl MediaStore {
    pub fn new(
        media: Arc<dyn MediaRepository>,
        content: Arc<dyn ContentRepository>,
        storage: Arc<dyn Storage>,
        validator: MediaValidator,
        generator: DerivativeGenerator,
        invalidator: Arc<CacheInvalidator>,
    ) -> Self {
        Self {
            media,
            content,
            storage,
            validator,
            generator,
            namer: FileNamer,
            invalidator,
        }
    }

    #[tracing::instrument(skip(self, request), fields(owner = %request.owner, context = ?request.context))]
    pub async fn store(&self, request: StoreMediaRequest) -> Result<Media, MediaStoreError> {
        let StoreMediaRequest {
            owner,
            input,
            context,
            caption,
            is_home_slider,
            is_featured,
            actor,
        } = request;

        let division_slug = self.resolve_owner(&owner).await?;

        let stored = match input {
            MediaInput::File(file) => self.store_file(&owner, file, context).await?,
            MediaInput::VideoUrl(url) => {
                let provider = self.validator.validate_video_url(&url)?;
                tracing::debug!(provider = ?provider, "Video URL accepted");
                StoredOriginal {
                    kind: MediaKind::Video,
                    path_or_embed: normalize_video_url(&url),
                    default_caption: String::new(),
                    width: None,
                    height: None,
                    bytes: None,
                }
            }
        };

        // read-then-write; concurrent uploads to one owner may share an order
        let order = self.media.max_order(&owner).await?.unwrap_or(0) + 1;

        let new_media = NewMedia {
            owner,
            kind: stored.kind,
            path_or_embed: stored.path_or_embed.clone(),
            caption: caption.unwrap_or(stored.default_caption),
            width: stored.width,
            height: stored.height,
            bytes: stored.bytes,
            is_home_slider,
            is_featured,
            order,
            uploaded_by: actor,
        };

        let media = match self.media.insert(new_media).await {
            Ok(media) => media,
            Err(e) => {
                if !showcase_core::models::is_external_reference(&stored.path_or_embed) {
                    if let Err(cleanup) = self.remove_blobs(&stored.path_or_embed, stored.kind).await {
                        tracing::warn!(
                            key = %stored.path_or_embed,
                            error = %cleanup,
                            "Failed to clean up blobs after insert failure"
                        );
                    }
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            media_id = %media.id,
            kind = %media.kind,
            order = media.order,
            "Media stored"
        );

        self.invalidator
            .invalidate(&ContentChangeEvent::MediaChanged {
                division_slug,
                home_slider: media.is_home_slider,
            })
            .await;

        Ok(media)
    }

    /// Validate and write the original, then derivatives. Nothing is written
    /// unless validation passes.
    async fn store_file(
        &self,
        owner: &MediaOwner,
        file: IncomingFile,
        context: UploadContext,
    ) -> Result<StoredOriginal, MediaStoreError> {
        let kind = file.detect_kind();
        let validated = self.validator.validate(&file, kind, context)?;

        let key = media_key(
            owner.owner_type(),
            Utc::now(),
            &self.namer.name(&file.filename),
        );

        let IncomingFile {
            filename,
            content_type,
            data,
        } = file;

        if let Err(e) = self.storage.put(&key, &content_type, data.clone()).await {
            tracing::error!(key = %key, error = %e, "Failed to store original");
            return Err(e.into());
        }

        let derivatives = match kind {
            MediaKind::Image => self.generator.generate_image_derivatives(&key, data).await,
            MediaKind::Video => self.generator.generate_video_thumbnail(&key, &data).await,
        };
        match derivatives {
            Ok(produced) => tracing::debug!(key = %key, count = produced.len(), "Derivatives stored"),
            Err(partial) => log_partial_failure(&key, &partial),
        }

        Ok(StoredOriginal {
            kind,
            path_or_embed: key,
            default_caption: filename,
            width: validated.width,
            height: validated.height,
            bytes: Some(validated.bytes),
        })
    }

    /// Remove the row, then the original and every derivative it may have.
    ///
    /// Missing derivatives are not errors and failures on them are only
    /// logged. A failure on the original is reported after the row is gone.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), MediaStoreError> {
        let media = self
            .media
            .get(id)
            .await?
            .ok_or(MediaStoreError::NotFound(id))?;

        let division_slug = self.division_slug(&media.owner).await;
        let removed = self.delete_media(&media).await;

        self.invalidator
            .invalidate(&ContentChangeEvent::MediaChanged {
                division_slug,
                home_slider: media.is_home_slider,
            })
            .await;

        removed
    }

    /// Delete every media item of `owner` without emitting change events.
    /// Used when the owner itself is being deleted.
    pub async fn purge_owner(&self, owner: &MediaOwner) -> Result<usize, MediaStoreError> {
        let items = self.media.list_by_owner(owner).await?;
        let count = items.len();
        for media in &items {
            if let Err(e) = self.delete_media(media).await {
                match e {
                    MediaStoreError::Storage(_) => {}
                    other => return Err(other),
                }
            }
        }
        if count > 0 {
            tracing::info!(owner = %owner, count, "Owner media purged");
        }
        Ok(count)
    }

    async fn delete_media(&self, media: &Media) -> Result<(), MediaStoreError> {
        if !self.media.delete(media.id).await? {
            return Err(MediaStoreError::NotFound(media.id));
        }

        match media.storage_key() {
            Some(key) => self.remove_blobs(key, media.kind).await,
            None => Ok(()),
        }
    }

    async fn remove_blobs(&self, original_key: &str, kind: MediaKind) -> Result<(), MediaStoreError> {
        for key in derivative_keys(original_key, kind) {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to delete derivative");
            }
        }

        if let Err(e) = self.storage.delete(original_key).await {
            tracing::error!(key = %original_key, error = %e, "Failed to delete original");
            return Err(e.into());
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, update), fields(media_id = %id))]
    pub async fn update_details(
        &self,
        id: Uuid,
        update: MediaUpdate,
    ) -> Result<Media, MediaStoreError> {
        let before = self
            .media
            .get(id)
            .await?
            .ok_or(MediaStoreError::NotFound(id))?;
        if update.is_empty() {
            return Ok(before);
        }

        let after = self
            .media
            .update_details(id, &update)
            .await?
            .ok_or(MediaStoreError::NotFound(id))?;

        let division_slug = self.division_slug(&after.owner).await;
        self.invalidator
            .invalidate(&ContentChangeEvent::MediaChanged {
                division_slug,
                home_slider: before.is_home_slider || after.is_home_slider,
            })
            .await;

        Ok(after)
    }

    /// Rewrite `order` for the listed media of `owner` in one step.
    ///
    /// Rejected without changes when an id is unknown, foreign or repeated, or
    /// when two media of the same kind would end up with the same order.
    #[tracing::instrument(skip(self, orders), fields(owner = %owner, count = orders.len()))]
    pub async fn reorder(
        &self,
        owner: &MediaOwner,
        orders: &[(Uuid, i32)],
    ) -> Result<Vec<Media>, MediaStoreError> {
        let current = self.media.list_by_owner(owner).await?;
        if orders.is_empty() {
            return Ok(current);
        }

        let mut seen = HashSet::new();
        for (id, _) in orders {
            if !seen.insert(*id) {
                return Err(MediaStoreError::InvalidReorder(format!(
                    "Media {} appears more than once",
                    id
                )));
            }
            if !current.iter().any(|m| m.id == *id) {
                return Err(MediaStoreError::InvalidReorder(format!(
                    "Media {} does not belong to {}",
                    id, owner
                )));
            }
        }

        let requested: HashMap<Uuid, i32> = orders.iter().copied().collect();
        check_order_collisions(&current, &requested)?;

        self.media.apply_order(owner, orders).await?;

        let home_slider = current
            .iter()
            .any(|m| m.is_home_slider && requested.contains_key(&m.id));
        let division_slug = self.division_slug(owner).await;
        self.invalidator
            .invalidate(&ContentChangeEvent::MediaChanged {
                division_slug,
                home_slider,
            })
            .await;

        Ok(self.media.list_by_owner(owner).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Media, MediaStoreError> {
        self.media
            .get(id)
            .await?
            .ok_or(MediaStoreError::NotFound(id))
    }

    pub async fn list(&self, owner: &MediaOwner) -> Result<Vec<Media>, MediaStoreError> {
        Ok(self.media.list_by_owner(owner).await?)
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Check that the owner exists. Returns its slug for division owners.
    async fn resolve_owner(&self, owner: &MediaOwner) -> Result<Option<String>, MediaStoreError> {
        let found = match owner {
            MediaOwner::Division(id) => {
                return self
                    .content
                    .get_division(*id)
                    .await?
                    .map(|d| Some(d.slug))
                    .ok_or(MediaStoreError::OwnerNotFound(*owner));
            }
            MediaOwner::Product(id) | MediaOwner::Technology(id) | MediaOwner::Machine(id) => self
                .content
                .get_catalog_item(*id)
                .await?
                .is_some_and(|item| item.media_owner() == *owner),
            MediaOwner::Client(id) => self.content.get_client(*id).await?.is_some(),
        };

        if found {
            Ok(None)
        } else {
            Err(MediaStoreError::OwnerNotFound(*owner))
        }
    }

    /// Slug of a division owner for cache eviction; lookup failures only cost
    /// a narrower eviction.
    async fn division_slug(&self, owner: &MediaOwner) -> Option<String> {
        let MediaOwner::Division(id) = owner else {
            return None;
        };
        match self.content.get_division(*id).await {
            Ok(division) => division.map(|d| d.slug),
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Failed to resolve division slug");
                None
            }
        }
    }
}

struct StoredOriginal {
    kind: MediaKind,
    path_or_embed: String,
    default_caption: String,
    width: Option<u32>,
    height: Option<u32>,
    bytes: Option<u64>,
}

/// Stored links always carry a scheme so they are never mistaken for keys.
fn normalize_video_url(url: &str) -> String {
    let url = url.trim();
    if showcase_core::models::is_external_reference(url) {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn log_partial_failure(original_key: &str, partial: &PartialFailure) {
    for failure in &partial.failures {
        tracing::warn!(
            original = %original_key,
            key = %failure.key,
            error = %failure.error,
            "Derivative generation failed, serving original"
        );
    }
    tracing::warn!(
        original = %original_key,
        written = partial.produced.len(),
        failed = partial.failures.len(),
        "Derivatives incomplete"
    );
}

/// Orders after the rewrite must be unique inside each kind group for every
/// media that is being moved.
fn check_order_collisions(
    current: &[Media],
    requested: &HashMap<Uuid, i32>,
) -> Result<(), MediaStoreError> {
    let final_order = |m: &Media| requested.get(&m.id).copied().unwrap_or(m.order);

    for moved in current.iter().filter(|m| requested.contains_key(&m.id)) {
        let order = final_order(moved);
        if let Some(other) = current
            .iter()
            .find(|m| m.id != moved.id && m.kind == moved.kind && final_order(m) == order)
        {
            return Err(MediaStoreError::InvalidReorder(format!(
                "Media {} and {} would share order {}",
                moved.id, other.id, order
            )));
        }
    }
    Ok(())
}
