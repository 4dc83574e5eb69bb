use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use showcase_core::models::{
    CatalogItem, CatalogItemInput, CatalogKind, Client, ClientInput, Division, Milestone,
    MilestoneInput, SiteSettings,
};
use showcase_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::conflict_on_unique;
use super::traits::{ContentRepository, DivisionRecord};

const DIVISION_COLUMNS: &str =
    "id, name, slug, summary, description, position, created_at, updated_at";
const CATALOG_COLUMNS: &str =
    "id, division_id, kind, name, description, position, created_at, updated_at";
const CLIENT_COLUMNS: &str = "id, name, website, position, created_at, updated_at";
const MILESTONE_COLUMNS: &str = "id, year, title, description, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CatalogItemRow {
    id: Uuid,
    division_id: Uuid,
    kind: String,
    name: String,
    description: Option<String>,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CatalogItemRow {
    fn into_item(self) -> Result<CatalogItem, AppError> {
        Ok(CatalogItem {
            id: self.id,
            division_id: self.division_id,
            kind: self.kind.parse().map_err(AppError::Internal)?,
            name: self.name,
            description: self.description,
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// PostgreSQL-backed repository for divisions, catalog items, clients,
/// milestones and the settings document.
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    // =============================================================================
    // DIVISIONS
    // =============================================================================

    #[tracing::instrument(skip(self), fields(db.table = "divisions", db.operation = "select"))]
    async fn list_divisions(&self) -> Result<Vec<Division>, AppError> {
        let divisions = sqlx::query_as::<Postgres, Division>(&format!(
            "SELECT {} FROM divisions ORDER BY position ASC, name ASC",
            DIVISION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(divisions)
    }

    #[tracing::instrument(skip(self), fields(db.table = "divisions", db.operation = "select", db.record_id = %id))]
    async fn get_division(&self, id: Uuid) -> Result<Option<Division>, AppError> {
        let division = sqlx::query_as::<Postgres, Division>(&format!(
            "SELECT {} FROM divisions WHERE id = $1",
            DIVISION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(division)
    }

    #[tracing::instrument(skip(self), fields(db.table = "divisions", db.operation = "select"))]
    async fn get_division_by_slug(&self, slug: &str) -> Result<Option<Division>, AppError> {
        let division = sqlx::query_as::<Postgres, Division>(&format!(
            "SELECT {} FROM divisions WHERE slug = $1",
            DIVISION_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(division)
    }

    #[tracing::instrument(skip(self), fields(db.table = "divisions", db.operation = "select"))]
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM divisions WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "divisions", db.operation = "insert", slug = %record.slug))]
    async fn insert_division(&self, record: DivisionRecord) -> Result<Division, AppError> {
        sqlx::query_as::<Postgres, Division>(&format!(
            r#"
            INSERT INTO divisions (id, name, slug, summary, description, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DIVISION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&record.name)
        .bind(&record.slug)
        .bind(&record.summary)
        .bind(&record.description)
        .bind(record.position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Division slug already exists"))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "divisions", db.operation = "update", db.record_id = %id))]
    async fn update_division(
        &self,
        id: Uuid,
        record: DivisionRecord,
    ) -> Result<Option<Division>, AppError> {
        sqlx::query_as::<Postgres, Division>(&format!(
            r#"
            UPDATE divisions
            SET name = $2, slug = $3, summary = $4, description = $5, position = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DIVISION_COLUMNS
        ))
        .bind(id)
        .bind(&record.name)
        .bind(&record.slug)
        .bind(&record.summary)
        .bind(&record.description)
        .bind(record.position)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Division slug already exists"))
    }

    /// Catalog items go with the division through `ON DELETE CASCADE`.
    #[tracing::instrument(skip(self), fields(db.table = "divisions", db.operation = "delete", db.record_id = %id))]
    async fn delete_division(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM divisions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =============================================================================
    // CATALOG ITEMS
    // =============================================================================

    #[tracing::instrument(skip(self), fields(db.table = "catalog_items", db.operation = "select"))]
    async fn list_catalog_items(
        &self,
        division_id: Uuid,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogItem>, AppError> {
        let rows = sqlx::query_as::<Postgres, CatalogItemRow>(&format!(
            r#"
            SELECT {} FROM catalog_items
            WHERE division_id = $1 AND ($2::text IS NULL OR kind = $2)
            ORDER BY kind ASC, position ASC, name ASC
            "#,
            CATALOG_COLUMNS
        ))
        .bind(division_id)
        .bind(kind.map(CatalogKind::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogItemRow::into_item).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "catalog_items", db.operation = "select", db.record_id = %id))]
    async fn get_catalog_item(&self, id: Uuid) -> Result<Option<CatalogItem>, AppError> {
        let row = sqlx::query_as::<Postgres, CatalogItemRow>(&format!(
            "SELECT {} FROM catalog_items WHERE id = $1",
            CATALOG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogItemRow::into_item).transpose()
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "catalog_items", db.operation = "insert", kind = %kind))]
    async fn insert_catalog_item(
        &self,
        division_id: Uuid,
        kind: CatalogKind,
        input: &CatalogItemInput,
    ) -> Result<CatalogItem, AppError> {
        let row = sqlx::query_as::<Postgres, CatalogItemRow>(&format!(
            r#"
            INSERT INTO catalog_items (id, division_id, kind, name, description, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CATALOG_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(division_id)
        .bind(kind.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.position)
        .fetch_one(&self.pool)
        .await?;

        row.into_item()
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "catalog_items", db.operation = "update", db.record_id = %id))]
    async fn update_catalog_item(
        &self,
        id: Uuid,
        input: &CatalogItemInput,
    ) -> Result<Option<CatalogItem>, AppError> {
        let row = sqlx::query_as::<Postgres, CatalogItemRow>(&format!(
            r#"
            UPDATE catalog_items
            SET name = $2, description = $3, position = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATALOG_COLUMNS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.position)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogItemRow::into_item).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "catalog_items", db.operation = "delete", db.record_id = %id))]
    async fn delete_catalog_item(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =============================================================================
    // CLIENTS
    // =============================================================================

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select"))]
    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<Postgres, Client>(&format!(
            "SELECT {} FROM clients ORDER BY position ASC, name ASC",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select", db.record_id = %id))]
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "clients", db.operation = "insert"))]
    async fn insert_client(&self, input: &ClientInput) -> Result<Client, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            r#"
            INSERT INTO clients (id, name, website, position)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.website)
        .bind(input.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "clients", db.operation = "update", db.record_id = %id))]
    async fn update_client(
        &self,
        id: Uuid,
        input: &ClientInput,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            r#"
            UPDATE clients
            SET name = $2, website = $3, position = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.website)
        .bind(input.position)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "delete", db.record_id = %id))]
    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =============================================================================
    // MILESTONES
    // =============================================================================

    #[tracing::instrument(skip(self), fields(db.table = "milestones", db.operation = "select"))]
    async fn list_milestones(&self) -> Result<Vec<Milestone>, AppError> {
        let milestones = sqlx::query_as::<Postgres, Milestone>(&format!(
            "SELECT {} FROM milestones ORDER BY year ASC, created_at ASC",
            MILESTONE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(milestones)
    }

    #[tracing::instrument(skip(self), fields(db.table = "milestones", db.operation = "select", db.record_id = %id))]
    async fn get_milestone(&self, id: Uuid) -> Result<Option<Milestone>, AppError> {
        let milestone = sqlx::query_as::<Postgres, Milestone>(&format!(
            "SELECT {} FROM milestones WHERE id = $1",
            MILESTONE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(milestone)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "milestones", db.operation = "insert"))]
    async fn insert_milestone(&self, input: &MilestoneInput) -> Result<Milestone, AppError> {
        let milestone = sqlx::query_as::<Postgres, Milestone>(&format!(
            r#"
            INSERT INTO milestones (id, year, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            MILESTONE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(input.year)
        .bind(&input.title)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(milestone)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "milestones", db.operation = "update", db.record_id = %id))]
    async fn update_milestone(
        &self,
        id: Uuid,
        input: &MilestoneInput,
    ) -> Result<Option<Milestone>, AppError> {
        let milestone = sqlx::query_as::<Postgres, Milestone>(&format!(
            r#"
            UPDATE milestones
            SET year = $2, title = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MILESTONE_COLUMNS
        ))
        .bind(id)
        .bind(input.year)
        .bind(&input.title)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(milestone)
    }

    #[tracing::instrument(skip(self), fields(db.table = "milestones", db.operation = "delete", db.record_id = %id))]
    async fn delete_milestone(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =============================================================================
    // SETTINGS
    // =============================================================================

    #[tracing::instrument(skip(self), fields(db.table = "site_settings", db.operation = "select"))]
    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        let data = sqlx::query_scalar::<Postgres, JsonValue>(
            "SELECT data FROM site_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match data {
            Some(value) => SiteSettings::from_json_value(&value).map_err(|e| {
                AppError::Internal(format!("Stored site settings are malformed: {}", e))
            }),
            None => Ok(SiteSettings::default()),
        }
    }

    #[tracing::instrument(skip(self, settings), fields(db.table = "site_settings", db.operation = "upsert"))]
    async fn save_settings(&self, settings: &SiteSettings) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (id, data, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(settings.to_json_value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
