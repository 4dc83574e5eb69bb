//! Content mutations
//!
//! Divisions, catalog items, clients, milestones and site settings. Each
//! successful write emits exactly one [`ContentChangeEvent`].

use showcase_core::models::{
    CatalogItem, CatalogItemInput, CatalogKind, Client, ClientInput, Division, DivisionInput,
    MediaOwner, Milestone, MilestoneInput, SiteSettings,
};
use showcase_core::slug::{slug_candidates, slugify};
use showcase_core::AppError;
use showcase_db::{ContentRepository, DivisionRecord};
use std::sync::Arc;
use uuid::Uuid;

use crate::invalidation::{CacheInvalidator, ContentChangeEvent};
use crate::media_store::MediaStore;

pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    media: Arc<MediaStore>,
    invalidator: Arc<CacheInvalidator>,
}

impl ContentService {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        media: Arc<MediaStore>,
        invalidator: Arc<CacheInvalidator>,
    ) -> Self {
        Self {
            content,
            media,
            invalidator,
        }
    }

    // ========================================================================
    // DIVISIONS
    // ========================================================================

    pub async fn list_divisions(&self) -> Result<Vec<Division>, AppError> {
        self.content.list_divisions().await
    }

    pub async fn get_division(&self, id: Uuid) -> Result<Division, AppError> {
        self.content
            .get_division(id)
            .await?
            .ok_or_else(|| division_not_found(id))
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_division(&self, input: DivisionInput) -> Result<Division, AppError> {
        let name = required_name(&input.name)?;
        let slug = self.free_slug(&slugify(&name), None).await?;

        let division = self
            .content
            .insert_division(DivisionRecord {
                name,
                slug,
                summary: input.summary,
                description: input.description,
                position: input.position,
            })
            .await?;

        tracing::info!(division_id = %division.id, slug = %division.slug, "Division created");
        self.invalidator
            .invalidate(&ContentChangeEvent::DivisionCreated {
                slug: division.slug.clone(),
            })
            .await;
        Ok(division)
    }

    /// The slug follows the name: it is recomputed only when the name changes.
    #[tracing::instrument(skip(self, input), fields(division_id = %id))]
    pub async fn update_division(&self, id: Uuid, input: DivisionInput) -> Result<Division, AppError> {
        let name = required_name(&input.name)?;
        let current = self.get_division(id).await?;

        let slug = if name == current.name {
            current.slug.clone()
        } else {
            self.free_slug(&slugify(&name), Some(id)).await?
        };

        let division = self
            .content
            .update_division(
                id,
                DivisionRecord {
                    name,
                    slug,
                    summary: input.summary,
                    description: input.description,
                    position: input.position,
                },
            )
            .await?
            .ok_or_else(|| division_not_found(id))?;

        let previous_slug = (division.slug != current.slug).then_some(current.slug);
        if previous_slug.is_some() {
            tracing::info!(slug = %division.slug, "Division slug changed");
        }
        self.invalidator
            .invalidate(&ContentChangeEvent::DivisionUpdated {
                slug: division.slug.clone(),
                previous_slug,
            })
            .await;
        Ok(division)
    }

    /// Delete a division with its catalog items and every media of both.
    #[tracing::instrument(skip(self), fields(division_id = %id))]
    pub async fn delete_division(&self, id: Uuid) -> Result<(), AppError> {
        let division = self.get_division(id).await?;

        let items = self.content.list_catalog_items(id, None).await?;
        let mut purged = 0;
        for item in &items {
            purged += self.media.purge_owner(&item.media_owner()).await?;
        }
        purged += self.media.purge_owner(&MediaOwner::Division(id)).await?;

        if !self.content.delete_division(id).await? {
            return Err(division_not_found(id));
        }

        tracing::info!(
            slug = %division.slug,
            catalog_items = items.len(),
            media = purged,
            "Division deleted"
        );
        self.invalidator
            .invalidate(&ContentChangeEvent::DivisionDeleted {
                slug: division.slug,
            })
            .await;
        Ok(())
    }

    /// First of `base`, `base-1`, `base-2`, ... not used by another division.
    async fn free_slug(&self, base: &str, exclude: Option<Uuid>) -> Result<String, AppError> {
        for candidate in slug_candidates(base) {
            if !self.content.slug_taken(&candidate, exclude).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(format!("No free slug for '{}'", base)))
    }

    // ========================================================================
    // CATALOG ITEMS
    // ========================================================================

    pub async fn list_catalog_items(
        &self,
        division_id: Uuid,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogItem>, AppError> {
        self.get_division(division_id).await?;
        self.content.list_catalog_items(division_id, kind).await
    }

    pub async fn get_catalog_item(&self, id: Uuid) -> Result<CatalogItem, AppError> {
        self.content
            .get_catalog_item(id)
            .await?
            .ok_or_else(|| catalog_item_not_found(id))
    }

    #[tracing::instrument(skip(self, input), fields(division_id = %division_id, kind = %kind))]
    pub async fn create_catalog_item(
        &self,
        division_id: Uuid,
        kind: CatalogKind,
        mut input: CatalogItemInput,
    ) -> Result<CatalogItem, AppError> {
        input.name = required_name(&input.name)?;
        let division = self.get_division(division_id).await?;

        let item = self
            .content
            .insert_catalog_item(division_id, kind, &input)
            .await?;

        tracing::info!(item_id = %item.id, "Catalog item created");
        self.invalidator
            .invalidate(&ContentChangeEvent::CatalogItemChanged {
                division_slug: division.slug,
            })
            .await;
        Ok(item)
    }

    #[tracing::instrument(skip(self, input), fields(item_id = %id))]
    pub async fn update_catalog_item(
        &self,
        id: Uuid,
        mut input: CatalogItemInput,
    ) -> Result<CatalogItem, AppError> {
        input.name = required_name(&input.name)?;
        let item = self
            .content
            .update_catalog_item(id, &input)
            .await?
            .ok_or_else(|| catalog_item_not_found(id))?;

        self.catalog_item_changed(item.division_id).await;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_catalog_item(&self, id: Uuid) -> Result<(), AppError> {
        let item = self.get_catalog_item(id).await?;
        let purged = self.media.purge_owner(&item.media_owner()).await?;

        if !self.content.delete_catalog_item(id).await? {
            return Err(catalog_item_not_found(id));
        }

        tracing::info!(kind = %item.kind, media = purged, "Catalog item deleted");
        self.catalog_item_changed(item.division_id).await;
        Ok(())
    }

    async fn catalog_item_changed(&self, division_id: Uuid) {
        match self.content.get_division(division_id).await {
            Ok(Some(division)) => {
                self.invalidator
                    .invalidate(&ContentChangeEvent::CatalogItemChanged {
                        division_slug: division.slug,
                    })
                    .await
            }
            Ok(None) => {
                tracing::warn!(division_id = %division_id, "Catalog item has no division")
            }
            Err(e) => tracing::warn!(
                division_id = %division_id,
                error = %e,
                "Failed to resolve division for invalidation"
            ),
        }
    }

    // ========================================================================
    // CLIENTS
    // ========================================================================

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.content.list_clients().await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.content
            .get_client(id)
            .await?
            .ok_or_else(|| client_not_found(id))
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_client(&self, mut input: ClientInput) -> Result<Client, AppError> {
        input.name = required_name(&input.name)?;
        let client = self.content.insert_client(&input).await?;

        tracing::info!(client_id = %client.id, "Client created");
        self.invalidator
            .invalidate(&ContentChangeEvent::ClientChanged)
            .await;
        Ok(client)
    }

    #[tracing::instrument(skip(self, input), fields(client_id = %id))]
    pub async fn update_client(&self, id: Uuid, mut input: ClientInput) -> Result<Client, AppError> {
        input.name = required_name(&input.name)?;
        let client = self
            .content
            .update_client(id, &input)
            .await?
            .ok_or_else(|| client_not_found(id))?;

        self.invalidator
            .invalidate(&ContentChangeEvent::ClientChanged)
            .await;
        Ok(client)
    }

    #[tracing::instrument(skip(self), fields(client_id = %id))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        self.get_client(id).await?;
        let purged = self.media.purge_owner(&MediaOwner::Client(id)).await?;

        if !self.content.delete_client(id).await? {
            return Err(client_not_found(id));
        }

        tracing::info!(media = purged, "Client deleted");
        self.invalidator
            .invalidate(&ContentChangeEvent::ClientChanged)
            .await;
        Ok(())
    }

    // ========================================================================
    // MILESTONES
    // ========================================================================

    pub async fn list_milestones(&self) -> Result<Vec<Milestone>, AppError> {
        self.content.list_milestones().await
    }

    pub async fn get_milestone(&self, id: Uuid) -> Result<Milestone, AppError> {
        self.content
            .get_milestone(id)
            .await?
            .ok_or_else(|| milestone_not_found(id))
    }

    #[tracing::instrument(skip(self, input), fields(year = input.year))]
    pub async fn create_milestone(&self, mut input: MilestoneInput) -> Result<Milestone, AppError> {
        input.title = required_title(&input.title)?;
        let milestone = self.content.insert_milestone(&input).await?;

        self.invalidator
            .invalidate(&ContentChangeEvent::MilestoneChanged)
            .await;
        Ok(milestone)
    }

    #[tracing::instrument(skip(self, input), fields(milestone_id = %id))]
    pub async fn update_milestone(
        &self,
        id: Uuid,
        mut input: MilestoneInput,
    ) -> Result<Milestone, AppError> {
        input.title = required_title(&input.title)?;
        let milestone = self
            .content
            .update_milestone(id, &input)
            .await?
            .ok_or_else(|| milestone_not_found(id))?;

        self.invalidator
            .invalidate(&ContentChangeEvent::MilestoneChanged)
            .await;
        Ok(milestone)
    }

    #[tracing::instrument(skip(self), fields(milestone_id = %id))]
    pub async fn delete_milestone(&self, id: Uuid) -> Result<(), AppError> {
        if !self.content.delete_milestone(id).await? {
            return Err(milestone_not_found(id));
        }

        self.invalidator
            .invalidate(&ContentChangeEvent::MilestoneChanged)
            .await;
        Ok(())
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    pub async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        self.content.get_settings().await
    }

    /// Merge the fields present in `patch` into the stored settings.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_settings(&self, patch: SiteSettings) -> Result<SiteSettings, AppError> {
        let mut settings = self.content.get_settings().await?;
        settings.merge(patch);
        self.content.save_settings(&settings).await?;

        tracing::info!("Site settings updated");
        self.invalidator
            .invalidate(&ContentChangeEvent::SettingsUpdated)
            .await;
        Ok(settings)
    }
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn required_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

fn division_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Division {} not found", id))
}

fn catalog_item_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Catalog item {} not found", id))
}

fn client_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Client {} not found", id))
}

fn milestone_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Milestone {} not found", id))
}
