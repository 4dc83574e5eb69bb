//! Showcase API Library
//!
//! HTTP handlers, extractors and application setup for the corporate site
//! backend.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use showcase_infra::ErrorResponse;
