//! In-memory repositories
//!
//! Same behaviour as the PostgreSQL repositories, kept in process memory. Used
//! by tests and by local runs without `DATABASE_URL`.

use async_trait::async_trait;
use chrono::Utc;
use showcase_core::models::{
    CatalogItem, CatalogItemInput, CatalogKind, Client, ClientInput, Division, Media, MediaOwner,
    MediaUpdate, Milestone, MilestoneInput, NewMedia, SiteSettings,
};
use showcase_core::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{ContentRepository, DivisionRecord, MediaRepository};

/// Media rows in insertion order, which breaks ties between equal `order`s.
#[derive(Clone, Default)]
pub struct InMemoryMediaRepository {
    rows: Arc<RwLock<Vec<Media>>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn sorted_by_order(mut media: Vec<Media>) -> Vec<Media> {
    // stable sort keeps insertion order for equal values
    media.sort_by_key(|m| m.order);
    media
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn insert(&self, media: NewMedia) -> Result<Media, AppError> {
        let now = Utc::now();
        let row = Media {
            id: Uuid::new_v4(),
            owner: media.owner,
            kind: media.kind,
            path_or_embed: media.path_or_embed,
            caption: media.caption,
            width: media.width,
            height: media.height,
            bytes: media.bytes,
            is_home_slider: media.is_home_slider,
            is_featured: media.is_featured,
            order: media.order,
            uploaded_by: media.uploaded_by,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        Ok(self.rows.read().await.iter().find(|m| m.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: &MediaOwner) -> Result<Vec<Media>, AppError> {
        let rows = self.rows.read().await;
        Ok(sorted_by_order(
            rows.iter().filter(|m| m.owner == *owner).cloned().collect(),
        ))
    }

    async fn list_home_slider(&self) -> Result<Vec<Media>, AppError> {
        let rows = self.rows.read().await;
        Ok(sorted_by_order(
            rows.iter().filter(|m| m.is_home_slider).cloned().collect(),
        ))
    }

    async fn max_order(&self, owner: &MediaOwner) -> Result<Option<i32>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|m| m.owner == *owner)
            .map(|m| m.order)
            .max())
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: &MediaUpdate,
    ) -> Result<Option<Media>, AppError> {
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|m| m.id == id).map(|media| {
            update.apply(media);
            media.updated_at = Utc::now();
            media.clone()
        }))
    }

    async fn apply_order(&self, owner: &MediaOwner, orders: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;

        // check everything before touching anything
        for (id, _) in orders {
            if !rows.iter().any(|m| m.id == *id && m.owner == *owner) {
                return Err(AppError::NotFound(format!(
                    "Media {} does not belong to {}",
                    id, owner
                )));
            }
        }

        let now = Utc::now();
        for (id, order) in orders {
            if let Some(media) = rows.iter_mut().find(|m| m.id == *id) {
                media.order = *order;
                media.updated_at = now;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|m| m.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
struct ContentState {
    divisions: Vec<Division>,
    catalog_items: Vec<CatalogItem>,
    clients: Vec<Client>,
    milestones: Vec<Milestone>,
    settings: SiteSettings,
}

#[derive(Clone, Default)]
pub struct InMemoryContentRepository {
    state: Arc<RwLock<ContentState>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_divisions(&self) -> Result<Vec<Division>, AppError> {
        let mut divisions = self.state.read().await.divisions.clone();
        divisions.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(divisions)
    }

    async fn get_division(&self, id: Uuid) -> Result<Option<Division>, AppError> {
        let state = self.state.read().await;
        Ok(state.divisions.iter().find(|d| d.id == id).cloned())
    }

    async fn get_division_by_slug(&self, slug: &str) -> Result<Option<Division>, AppError> {
        let state = self.state.read().await;
        Ok(state.divisions.iter().find(|d| d.slug == slug).cloned())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let state = self.state.read().await;
        Ok(state
            .divisions
            .iter()
            .any(|d| d.slug == slug && Some(d.id) != exclude))
    }

    async fn insert_division(&self, record: DivisionRecord) -> Result<Division, AppError> {
        let mut state = self.state.write().await;
        if state.divisions.iter().any(|d| d.slug == record.slug) {
            return Err(AppError::Conflict("Division slug already exists".to_string()));
        }

        let now = Utc::now();
        let division = Division {
            id: Uuid::new_v4(),
            name: record.name,
            slug: record.slug,
            summary: record.summary,
            description: record.description,
            position: record.position,
            created_at: now,
            updated_at: now,
        };
        state.divisions.push(division.clone());
        Ok(division)
    }

    async fn update_division(
        &self,
        id: Uuid,
        record: DivisionRecord,
    ) -> Result<Option<Division>, AppError> {
        let mut state = self.state.write().await;
        if state
            .divisions
            .iter()
            .any(|d| d.slug == record.slug && d.id != id)
        {
            return Err(AppError::Conflict("Division slug already exists".to_string()));
        }

        Ok(state.divisions.iter_mut().find(|d| d.id == id).map(|division| {
            division.name = record.name;
            division.slug = record.slug;
            division.summary = record.summary;
            division.description = record.description;
            division.position = record.position;
            division.updated_at = Utc::now();
            division.clone()
        }))
    }

    async fn delete_division(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.divisions.len();
        state.divisions.retain(|d| d.id != id);
        let removed = state.divisions.len() != before;
        if removed {
            state.catalog_items.retain(|item| item.division_id != id);
        }
        Ok(removed)
    }

    async fn list_catalog_items(
        &self,
        division_id: Uuid,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogItem>, AppError> {
        let state = self.state.read().await;
        let mut items: Vec<CatalogItem> = state
            .catalog_items
            .iter()
            .filter(|item| item.division_id == division_id)
            .filter(|item| kind.is_none_or(|k| item.kind == k))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.kind
                .as_str()
                .cmp(b.kind.as_str())
                .then_with(|| a.position.cmp(&b.position))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    async fn get_catalog_item(&self, id: Uuid) -> Result<Option<CatalogItem>, AppError> {
        let state = self.state.read().await;
        Ok(state.catalog_items.iter().find(|item| item.id == id).cloned())
    }

    async fn insert_catalog_item(
        &self,
        division_id: Uuid,
        kind: CatalogKind,
        input: &CatalogItemInput,
    ) -> Result<CatalogItem, AppError> {
        let mut state = self.state.write().await;
        if !state.divisions.iter().any(|d| d.id == division_id) {
            return Err(AppError::NotFound(format!("Division {} not found", division_id)));
        }

        let now = Utc::now();
        let item = CatalogItem {
            id: Uuid::new_v4(),
            division_id,
            kind,
            name: input.name.clone(),
            description: input.description.clone(),
            position: input.position,
            created_at: now,
            updated_at: now,
        };
        state.catalog_items.push(item.clone());
        Ok(item)
    }

    async fn update_catalog_item(
        &self,
        id: Uuid,
        input: &CatalogItemInput,
    ) -> Result<Option<CatalogItem>, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .catalog_items
            .iter_mut()
            .find(|item| item.id == id)
            .map(|item| {
                item.name = input.name.clone();
                item.description = input.description.clone();
                item.position = input.position;
                item.updated_at = Utc::now();
                item.clone()
            }))
    }

    async fn delete_catalog_item(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.catalog_items.len();
        state.catalog_items.retain(|item| item.id != id);
        Ok(state.catalog_items.len() != before)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let mut clients = self.state.read().await.clients.clone();
        clients.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let state = self.state.read().await;
        Ok(state.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_client(&self, input: &ClientInput) -> Result<Client, AppError> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            website: input.website.clone(),
            position: input.position,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(
        &self,
        id: Uuid,
        input: &ClientInput,
    ) -> Result<Option<Client>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.clients.iter_mut().find(|c| c.id == id).map(|client| {
            client.name = input.name.clone();
            client.website = input.website.clone();
            client.position = input.position;
            client.updated_at = Utc::now();
            client.clone()
        }))
    }

    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.clients.len();
        state.clients.retain(|c| c.id != id);
        Ok(state.clients.len() != before)
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, AppError> {
        let mut milestones = self.state.read().await.milestones.clone();
        milestones.sort_by_key(|m| m.year);
        Ok(milestones)
    }

    async fn get_milestone(&self, id: Uuid) -> Result<Option<Milestone>, AppError> {
        let state = self.state.read().await;
        Ok(state.milestones.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_milestone(&self, input: &MilestoneInput) -> Result<Milestone, AppError> {
        let now = Utc::now();
        let milestone = Milestone {
            id: Uuid::new_v4(),
            year: input.year,
            title: input.title.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.milestones.push(milestone.clone());
        Ok(milestone)
    }

    async fn update_milestone(
        &self,
        id: Uuid,
        input: &MilestoneInput,
    ) -> Result<Option<Milestone>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.milestones.iter_mut().find(|m| m.id == id).map(|milestone| {
            milestone.year = input.year;
            milestone.title = input.title.clone();
            milestone.description = input.description.clone();
            milestone.updated_at = Utc::now();
            milestone.clone()
        }))
    }

    async fn delete_milestone(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.milestones.len();
        state.milestones.retain(|m| m.id != id);
        Ok(state.milestones.len() != before)
    }

    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &SiteSettings) -> Result<(), AppError> {
        self.state.write().await.settings = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::models::MediaKind;

    fn new_media(owner: MediaOwner, order: i32) -> NewMedia {
        NewMedia {
            owner,
            kind: MediaKind::Image,
            path_or_embed: format!("media/division/2026/10/{}.jpg", order),
            caption: String::new(),
            width: Some(800),
            height: Some(600),
            bytes: Some(1024),
            is_home_slider: false,
            is_featured: false,
            order,
            uploaded_by: Uuid::new_v4(),
        }
    }

    fn record(name: &str, slug: &str) -> DivisionRecord {
        DivisionRecord {
            name: name.to_string(),
            slug: slug.to_string(),
            summary: None,
            description: None,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_media_listing_and_max_order() {
        let repo = InMemoryMediaRepository::new();
        let owner = MediaOwner::Division(Uuid::new_v4());
        let other = MediaOwner::Client(Uuid::new_v4());

        assert_eq!(repo.max_order(&owner).await.unwrap(), None);

        let second = repo.insert(new_media(owner, 2)).await.unwrap();
        let first = repo.insert(new_media(owner, 1)).await.unwrap();
        repo.insert(new_media(other, 7)).await.unwrap();

        let listed = repo.list_by_owner(&owner).await.unwrap();
        assert_eq!(
            listed.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(repo.max_order(&owner).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_apply_order_is_all_or_nothing() {
        let repo = InMemoryMediaRepository::new();
        let owner = MediaOwner::Division(Uuid::new_v4());
        let a = repo.insert(new_media(owner, 1)).await.unwrap();
        let foreign = repo
            .insert(new_media(MediaOwner::Client(Uuid::new_v4()), 1))
            .await
            .unwrap();

        let result = repo.apply_order(&owner, &[(a.id, 5), (foreign.id, 6)]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.get(a.id).await.unwrap().unwrap().order, 1);

        repo.apply_order(&owner, &[(a.id, 5)]).await.unwrap();
        assert_eq!(repo.get(a.id).await.unwrap().unwrap().order, 5);
    }

    #[tokio::test]
    async fn test_update_details_and_delete() {
        let repo = InMemoryMediaRepository::new();
        let media = repo
            .insert(new_media(MediaOwner::Division(Uuid::new_v4()), 1))
            .await
            .unwrap();

        let update = MediaUpdate {
            is_featured: Some(true),
            ..Default::default()
        };
        let updated = repo.update_details(media.id, &update).await.unwrap().unwrap();
        assert!(updated.is_featured);
        assert!(!updated.is_home_slider);

        assert!(repo.delete(media.id).await.unwrap());
        assert!(!repo.delete(media.id).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_division_slug_conflict_and_cascade() {
        let repo = InMemoryContentRepository::new();
        let division = repo.insert_division(record("Mining", "mining")).await.unwrap();

        let duplicate = repo.insert_division(record("Mining", "mining")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
        assert!(repo.slug_taken("mining", None).await.unwrap());
        assert!(!repo.slug_taken("mining", Some(division.id)).await.unwrap());

        let input = CatalogItemInput {
            name: "Excavator".to_string(),
            ..Default::default()
        };
        let item = repo
            .insert_catalog_item(division.id, CatalogKind::Machine, &input)
            .await
            .unwrap();
        assert_eq!(
            repo.list_catalog_items(division.id, Some(CatalogKind::Product))
                .await
                .unwrap()
                .len(),
            0
        );

        assert!(repo.delete_division(division.id).await.unwrap());
        assert!(repo.get_catalog_item(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let repo = InMemoryContentRepository::new();
        assert_eq!(repo.get_settings().await.unwrap().site_name(), "Our Company");

        let settings = SiteSettings {
            site_name: Some("Acme".to_string()),
            ..Default::default()
        };
        repo.save_settings(&settings).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap().site_name(), "Acme");
    }
}
