//! Repository traits
//!
//! Services depend on these rather than on a concrete database so they can run
//! against PostgreSQL in production and the in-memory store in tests.

use async_trait::async_trait;
use showcase_core::models::{
    CatalogItem, CatalogItemInput, CatalogKind, Client, ClientInput, Division, Media, MediaOwner,
    MediaUpdate, Milestone, MilestoneInput, NewMedia, SiteSettings,
};
use showcase_core::AppError;
use uuid::Uuid;

/// Persisted division fields; the slug is computed by the caller.
#[derive(Debug, Clone)]
pub struct DivisionRecord {
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub position: i32,
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn insert(&self, media: NewMedia) -> Result<Media, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError>;

    /// Media of one owner in display order (`order`, then insertion).
    async fn list_by_owner(&self, owner: &MediaOwner) -> Result<Vec<Media>, AppError>;

    async fn list_home_slider(&self) -> Result<Vec<Media>, AppError>;

    /// Highest `order` among the owner's media, `None` when it has none.
    async fn max_order(&self, owner: &MediaOwner) -> Result<Option<i32>, AppError>;

    /// Apply caption/flag edits. `None` when the media does not exist.
    async fn update_details(&self, id: Uuid, update: &MediaUpdate)
        -> Result<Option<Media>, AppError>;

    /// Rewrite `order` for every listed media of `owner` in one atomic step.
    /// Ids that are not owned by `owner` fail the whole call.
    async fn apply_order(&self, owner: &MediaOwner, orders: &[(Uuid, i32)]) -> Result<(), AppError>;

    /// Delete the row. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_divisions(&self) -> Result<Vec<Division>, AppError>;
    async fn get_division(&self, id: Uuid) -> Result<Option<Division>, AppError>;
    async fn get_division_by_slug(&self, slug: &str) -> Result<Option<Division>, AppError>;
    /// Whether `slug` is used by a division other than `exclude`.
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;
    async fn insert_division(&self, record: DivisionRecord) -> Result<Division, AppError>;
    async fn update_division(
        &self,
        id: Uuid,
        record: DivisionRecord,
    ) -> Result<Option<Division>, AppError>;
    /// Removes the division and its catalog items.
    async fn delete_division(&self, id: Uuid) -> Result<bool, AppError>;

    /// Catalog items of a division, optionally limited to one kind.
    async fn list_catalog_items(
        &self,
        division_id: Uuid,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogItem>, AppError>;
    async fn get_catalog_item(&self, id: Uuid) -> Result<Option<CatalogItem>, AppError>;
    async fn insert_catalog_item(
        &self,
        division_id: Uuid,
        kind: CatalogKind,
        input: &CatalogItemInput,
    ) -> Result<CatalogItem, AppError>;
    async fn update_catalog_item(
        &self,
        id: Uuid,
        input: &CatalogItemInput,
    ) -> Result<Option<CatalogItem>, AppError>;
    async fn delete_catalog_item(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list_clients(&self) -> Result<Vec<Client>, AppError>;
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError>;
    async fn insert_client(&self, input: &ClientInput) -> Result<Client, AppError>;
    async fn update_client(&self, id: Uuid, input: &ClientInput)
        -> Result<Option<Client>, AppError>;
    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError>;

    /// Milestones in chronological order.
    async fn list_milestones(&self) -> Result<Vec<Milestone>, AppError>;
    async fn get_milestone(&self, id: Uuid) -> Result<Option<Milestone>, AppError>;
    async fn insert_milestone(&self, input: &MilestoneInput) -> Result<Milestone, AppError>;
    async fn update_milestone(
        &self,
        id: Uuid,
        input: &MilestoneInput,
    ) -> Result<Option<Milestone>, AppError>;
    async fn delete_milestone(&self, id: Uuid) -> Result<bool, AppError>;

    async fn get_settings(&self) -> Result<SiteSettings, AppError>;
    async fn save_settings(&self, settings: &SiteSettings) -> Result<(), AppError>;
}
