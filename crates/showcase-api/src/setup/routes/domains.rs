//! Domain route groups (admin media, admin content, public site).

use crate::constants::{ADMIN_PREFIX, SITE_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;

pub fn media_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/media", ADMIN_PREFIX),
            post(handlers::media::upload_media).get(handlers::media::list_media),
        )
        .route(
            &format!("{}/media/reorder", ADMIN_PREFIX),
            put(handlers::media::reorder_media),
        )
        .route(
            &format!("{}/media/{{id}}", ADMIN_PREFIX),
            patch(handlers::media::update_media).delete(handlers::media::delete_media),
        )
        .with_state(state)
}

pub fn division_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/divisions", ADMIN_PREFIX),
            get(handlers::content::list_divisions).post(handlers::content::create_division),
        )
        .route(
            &format!("{}/divisions/{{id}}", ADMIN_PREFIX),
            get(handlers::content::get_division)
                .put(handlers::content::update_division)
                .delete(handlers::content::delete_division),
        )
        .route(
            &format!("{}/divisions/{{id}}/catalog", ADMIN_PREFIX),
            get(handlers::content::list_catalog_items),
        )
        .route(
            &format!("{}/divisions/{{id}}/catalog/{{kind}}", ADMIN_PREFIX),
            post(handlers::content::create_catalog_item),
        )
        .route(
            &format!("{}/catalog/{{id}}", ADMIN_PREFIX),
            get(handlers::content::get_catalog_item)
                .put(handlers::content::update_catalog_item)
                .delete(handlers::content::delete_catalog_item),
        )
        .with_state(state)
}

pub fn company_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/clients", ADMIN_PREFIX),
            get(handlers::content::list_clients).post(handlers::content::create_client),
        )
        .route(
            &format!("{}/clients/{{id}}", ADMIN_PREFIX),
            get(handlers::content::get_client)
                .put(handlers::content::update_client)
                .delete(handlers::content::delete_client),
        )
        .route(
            &format!("{}/milestones", ADMIN_PREFIX),
            get(handlers::content::list_milestones).post(handlers::content::create_milestone),
        )
        .route(
            &format!("{}/milestones/{{id}}", ADMIN_PREFIX),
            get(handlers::content::get_milestone)
                .put(handlers::content::update_milestone)
                .delete(handlers::content::delete_milestone),
        )
        .route(
            &format!("{}/settings", ADMIN_PREFIX),
            get(handlers::content::get_settings).put(handlers::content::update_settings),
        )
        .route(
            &format!("{}/cache/warm", ADMIN_PREFIX),
            post(handlers::content::warm_cache),
        )
        .with_state(state)
}

pub fn site_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/home", SITE_PREFIX), get(handlers::site::home))
        .route(&format!("{}/divisions", SITE_PREFIX), get(handlers::site::divisions))
        .route(
            &format!("{}/divisions/{{slug}}", SITE_PREFIX),
            get(handlers::site::division),
        )
        .route(&format!("{}/milestones", SITE_PREFIX), get(handlers::site::milestones))
        .route(&format!("{}/settings", SITE_PREFIX), get(handlers::site::settings))
        .route(&format!("{}/visi-misi", SITE_PREFIX), get(handlers::site::visi_misi))
        .route("/sitemap.xml", get(handlers::site::sitemap))
        .route("/robots.txt", get(handlers::site::robots))
        .with_state(state)
}
