//! Public site handlers
//!
//! Every response is a cached snapshot; a miss builds it from the database.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use showcase_services::{robots_txt, CacheKey};
use std::sync::Arc;

async fn snapshot(state: &AppState, key: CacheKey) -> Result<impl IntoResponse, HttpAppError> {
    let body = state.snapshots.get(&key).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn home(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::Home).await
}

pub async fn divisions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::DivisionsIndex).await
}

pub async fn division(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::Division(slug.to_lowercase())).await
}

pub async fn milestones(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::Milestones).await
}

pub async fn settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::Settings).await
}

pub async fn visi_misi(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    snapshot(&state, CacheKey::VisiMisi).await
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HttpAppError> {
    let xml = state.snapshots.get(&CacheKey::Sitemap).await?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&state.config.public_base_url),
    )
}
