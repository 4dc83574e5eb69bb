use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showcase_core::models::{Media, MediaKind, MediaOwner, MediaUpdate, NewMedia};
use showcase_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::MediaRepository;
use super::transaction::TransactionGuard;

const MEDIA_COLUMNS: &str = "id, owner_type, owner_id, kind, path_or_embed, caption, width, height, \
     bytes, is_home_slider, is_featured, sort_order, uploaded_by, created_at, updated_at";

/// Raw `media` row; owner and kind are stored as text tags.
#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    owner_type: String,
    owner_id: Uuid,
    kind: String,
    path_or_embed: String,
    caption: String,
    width: Option<i32>,
    height: Option<i32>,
    bytes: Option<i64>,
    is_home_slider: bool,
    is_featured: bool,
    sort_order: i32,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MediaRow {
    fn into_media(self) -> Result<Media, AppError> {
        let owner = MediaOwner::from_parts(&self.owner_type, self.owner_id)
            .map_err(AppError::Internal)?;
        let kind: MediaKind = self.kind.parse().map_err(AppError::Internal)?;

        Ok(Media {
            id: self.id,
            owner,
            kind,
            path_or_embed: self.path_or_embed,
            caption: self.caption,
            width: self.width.and_then(|w| u32::try_from(w).ok()),
            height: self.height.and_then(|h| u32::try_from(h).ok()),
            bytes: self.bytes.and_then(|b| u64::try_from(b).ok()),
            is_home_slider: self.is_home_slider,
            is_featured: self.is_featured,
            order: self.sort_order,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_media_list(rows: Vec<MediaRow>) -> Result<Vec<Media>, AppError> {
    rows.into_iter().map(MediaRow::into_media).collect()
}

/// PostgreSQL-backed media repository
#[derive(Clone)]
pub struct PgMediaRepository {
    pool: PgPool,
}

impl PgMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.operation = "insert", owner = %media.owner))]
    async fn insert(&self, media: NewMedia) -> Result<Media, AppError> {
        let row = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            INSERT INTO media (id, owner_type, owner_id, kind, path_or_embed, caption, width, height,
                               bytes, is_home_slider, is_featured, sort_order, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(media.owner.owner_type().as_str())
        .bind(media.owner.id())
        .bind(media.kind.as_str())
        .bind(&media.path_or_embed)
        .bind(&media.caption)
        .bind(media.width.and_then(|w| i32::try_from(w).ok()))
        .bind(media.height.and_then(|h| i32::try_from(h).ok()))
        .bind(media.bytes.and_then(|b| i64::try_from(b).ok()))
        .bind(media.is_home_slider)
        .bind(media.is_featured)
        .bind(media.order)
        .bind(media.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        row.into_media()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {} FROM media WHERE id = $1",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MediaRow::into_media).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", owner = %owner))]
    async fn list_by_owner(&self, owner: &MediaOwner) -> Result<Vec<Media>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            SELECT {} FROM media
            WHERE owner_type = $1 AND owner_id = $2
            ORDER BY sort_order ASC, created_at ASC
            "#,
            MEDIA_COLUMNS
        ))
        .bind(owner.owner_type().as_str())
        .bind(owner.id())
        .fetch_all(&self.pool)
        .await?;

        into_media_list(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_home_slider(&self) -> Result<Vec<Media>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {} FROM media WHERE is_home_slider ORDER BY sort_order ASC, created_at ASC",
            MEDIA_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_media_list(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", owner = %owner))]
    async fn max_order(&self, owner: &MediaOwner) -> Result<Option<i32>, AppError> {
        let max = sqlx::query_scalar::<Postgres, Option<i32>>(
            "SELECT MAX(sort_order) FROM media WHERE owner_type = $1 AND owner_id = $2",
        )
        .bind(owner.owner_type().as_str())
        .bind(owner.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(max)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update_details(
        &self,
        id: Uuid,
        update: &MediaUpdate,
    ) -> Result<Option<Media>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            UPDATE media
            SET caption = COALESCE($2, caption),
                is_home_slider = COALESCE($3, is_home_slider),
                is_featured = COALESCE($4, is_featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        ))
        .bind(id)
        .bind(update.caption.as_deref())
        .bind(update.is_home_slider)
        .bind(update.is_featured)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MediaRow::into_media).transpose()
    }

    #[tracing::instrument(skip(self, orders), fields(db.table = "media", db.operation = "update", owner = %owner, count = orders.len()))]
    async fn apply_order(&self, owner: &MediaOwner, orders: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        for (id, order) in orders {
            let result = sqlx::query(
                r#"
                UPDATE media SET sort_order = $1, updated_at = NOW()
                WHERE id = $2 AND owner_type = $3 AND owner_id = $4
                "#,
            )
            .bind(order)
            .bind(id)
            .bind(owner.owner_type().as_str())
            .bind(owner.id())
            .execute(tx.connection()?)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!(
                    "Media {} does not belong to {}",
                    id, owner
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
