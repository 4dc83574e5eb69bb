//! Admin content handlers
//!
//! Thin wrappers over `ContentService`; cache invalidation happens there.

use crate::auth::Actor;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use showcase_core::models::{
    CatalogItemInput, CatalogKind, ClientInput, DivisionInput, MilestoneInput, SiteSettings,
};
use showcase_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

fn parse_kind(kind: &str) -> Result<CatalogKind, AppError> {
    kind.parse::<CatalogKind>().map_err(AppError::InvalidInput)
}

// ============================================================================
// DIVISIONS
// ============================================================================

pub async fn list_divisions(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.list_divisions().await?))
}

pub async fn get_division(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.get_division(id).await?))
}

pub async fn create_division(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<DivisionInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let division = state.content.create_division(input).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

pub async fn update_division(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<DivisionInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.update_division(id, input).await?))
}

pub async fn delete_division(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.content.delete_division(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// CATALOG ITEMS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub kind: Option<String>,
}

pub async fn list_catalog_items(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(division_id): Path<Uuid>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let kind = query.kind.as_deref().map(parse_kind).transpose()?;
    Ok(Json(state.content.list_catalog_items(division_id, kind).await?))
}

/// `kind` is one of products, technologies or machines (singular also accepted).
pub async fn create_catalog_item(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path((division_id, kind)): Path<(Uuid, String)>,
    ValidatedJson(input): ValidatedJson<CatalogItemInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let kind = parse_kind(&kind)?;
    let item = state
        .content
        .create_catalog_item(division_id, kind, input)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_catalog_item(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.get_catalog_item(id).await?))
}

pub async fn update_catalog_item(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<CatalogItemInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.update_catalog_item(id, input).await?))
}

pub async fn delete_catalog_item(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.content.delete_catalog_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// CLIENTS
// ============================================================================

pub async fn list_clients(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.list_clients().await?))
}

pub async fn create_client(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<ClientInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let client = state.content.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.get_client(id).await?))
}

pub async fn update_client(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<ClientInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.update_client(id, input).await?))
}

pub async fn delete_client(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.content.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// MILESTONES
// ============================================================================

pub async fn list_milestones(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.list_milestones().await?))
}

pub async fn create_milestone(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<MilestoneInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let milestone = state.content.create_milestone(input).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

pub async fn get_milestone(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.get_milestone(id).await?))
}

pub async fn update_milestone(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<MilestoneInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.update_milestone(id, input).await?))
}

pub async fn delete_milestone(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.content.delete_milestone(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// SETTINGS & CACHE
// ============================================================================

pub async fn get_settings(
    _actor: Actor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.get_settings().await?))
}

/// Fields present in the body overwrite stored ones; an empty string clears one.
#[tracing::instrument(skip(state, patch), fields(actor = %actor.0))]
pub async fn update_settings(
    actor: Actor,
    State(state): State<Arc<AppState>>,
    ValidatedJson(patch): ValidatedJson<SiteSettings>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.content.update_settings(patch).await?))
}

/// Flush everything cached, then rebuild the landing snapshots.
#[tracing::instrument(skip(state), fields(actor = %actor.0))]
pub async fn warm_cache(
    actor: Actor,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.invalidator.flush_and_warm().await;
    Ok(StatusCode::ACCEPTED)
}
