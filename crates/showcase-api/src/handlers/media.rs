//! Admin media handlers: upload, edit, reorder, delete, list.

use crate::auth::Actor;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use showcase_core::models::{Media, MediaOwner, MediaUpdate, UploadContext};
use showcase_core::AppError;
use showcase_services::snapshots::MediaView;
use showcase_services::{IncomingFile, MediaInput, StoreMediaRequest};
use std::sync::Arc;
use uuid::Uuid;

/// A stored media row together with its public URLs.
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    #[serde(flatten)]
    pub media: Media,
    pub urls: MediaView,
}

impl MediaResponse {
    fn new(media: Media, state: &AppState) -> Self {
        let urls = MediaView::new(&media, state.storage.as_ref());
        Self { media, urls }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_type: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub owner_type: String,
    pub owner_id: Uuid,
    pub orders: Vec<ReorderEntry>,
}

fn parse_owner(owner_type: &str, owner_id: Uuid) -> Result<MediaOwner, AppError> {
    MediaOwner::from_parts(owner_type, owner_id).map_err(AppError::InvalidInput)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "false" | "off" | "no" => Ok(false),
        "1" | "true" | "on" | "yes" => Ok(true),
        other => Err(AppError::InvalidInput(format!(
            "Field '{}' must be a boolean, got '{}'",
            name, other
        ))),
    }
}

/// Multipart fields of an upload, before they are checked for consistency.
#[derive(Default)]
struct UploadForm {
    owner_type: Option<String>,
    owner_id: Option<String>,
    context: Option<String>,
    caption: Option<String>,
    is_home_slider: Option<String>,
    is_featured: Option<String>,
    video_url: Option<String>,
    file: Option<IncomingFile>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().unwrap_or("unknown").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            form.file = Some(IncomingFile::new(filename, content_type, data.to_vec()));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read field '{}': {}", field_name, e)))?;
        let slot = match field_name.as_str() {
            "owner_type" => &mut form.owner_type,
            "owner_id" => &mut form.owner_id,
            "context" => &mut form.context,
            "caption" => &mut form.caption,
            "is_home_slider" => &mut form.is_home_slider,
            "is_featured" => &mut form.is_featured,
            "video_url" => &mut form.video_url,
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
                continue;
            }
        };
        *slot = Some(text);
    }

    Ok(form)
}

impl UploadForm {
    fn into_request(self, actor: Uuid) -> Result<StoreMediaRequest, AppError> {
        let owner_type = self
            .owner_type
            .ok_or_else(|| AppError::InvalidInput("Missing field 'owner_type'".to_string()))?;
        let owner_id = self
            .owner_id
            .ok_or_else(|| AppError::InvalidInput("Missing field 'owner_id'".to_string()))?;
        let owner_id = Uuid::parse_str(owner_id.trim())?;
        let owner = parse_owner(&owner_type, owner_id)?;

        let context = self
            .context
            .as_deref()
            .unwrap_or_default()
            .parse::<UploadContext>()
            .map_err(AppError::InvalidInput)?;

        let video_url = self.video_url.filter(|url| !url.trim().is_empty());
        let input = match (self.file, video_url) {
            (Some(file), None) => MediaInput::File(file),
            (None, Some(url)) => MediaInput::VideoUrl(url),
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidInput(
                    "Send either 'file' or 'video_url', not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(AppError::InvalidInput(
                    "No file or video_url provided".to_string(),
                ))
            }
        };

        let caption = self.caption.filter(|c| !c.trim().is_empty());
        let is_home_slider = match self.is_home_slider {
            Some(value) => parse_flag("is_home_slider", &value)?,
            None => false,
        };
        let is_featured = match self.is_featured {
            Some(value) => parse_flag("is_featured", &value)?,
            None => false,
        };

        Ok(StoreMediaRequest {
            owner,
            input,
            context,
            caption,
            is_home_slider,
            is_featured,
            actor,
        })
    }
}

#[tracing::instrument(skip(state, multipart), fields(actor = %actor.0, operation = "upload_media"))]
pub async fn upload_media(
    actor: Actor,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = read_upload_form(multipart).await?.into_request(actor.0)?;
    let media = state.media.store(request).await?;

    Ok((StatusCode::CREATED, Json(MediaResponse::new(media, &state))))
}

pub async fn list_media(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner = parse_owner(&query.owner_type, query.owner_id)?;
    let media = state.media.list(&owner).await?;

    let body: Vec<MediaResponse> = media
        .into_iter()
        .map(|m| MediaResponse::new(m, &state))
        .collect();
    Ok(Json(body))
}

#[tracing::instrument(skip(state, update), fields(actor = %actor.0, media_id = %id))]
pub async fn update_media(
    actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<MediaUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = state.media.update_details(id, update).await?;
    Ok(Json(MediaResponse::new(media, &state)))
}

#[tracing::instrument(skip(state, request), fields(actor = %actor.0))]
pub async fn reorder_media(
    actor: Actor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ReorderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner = parse_owner(&request.owner_type, request.owner_id)?;
    let orders: Vec<(Uuid, i32)> = request.orders.iter().map(|e| (e.id, e.order)).collect();

    let media = state.media.reorder(&owner, &orders).await?;

    let body: Vec<MediaResponse> = media
        .into_iter()
        .map(|m| MediaResponse::new(m, &state))
        .collect();
    Ok(Json(body))
}

#[tracing::instrument(skip(state), fields(actor = %actor.0, media_id = %id))]
pub async fn delete_media(
    actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.media.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
