//! Admin identity.
//!
//! Authentication happens upstream; this service only trusts the user id the
//! auth layer forwards in the `x-actor-id` header.

use crate::constants::ACTOR_HEADER;
use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use showcase_core::AppError;
use uuid::Uuid;

/// The admin user performing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(ACTOR_HEADER).ok_or_else(|| {
            HttpAppError(AppError::Unauthorized(format!("Missing {} header", ACTOR_HEADER)))
        })?;

        header
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Actor)
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(format!(
                    "Invalid {} header",
                    ACTOR_HEADER
                )))
            })
    }
}
