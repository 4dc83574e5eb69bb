//! Database repositories for data access layer
//!
//! `media` holds the polymorphic media attachments, `content` the divisions,
//! catalog items, clients, milestones and the settings document.
//
// Repository traits shared by every backend
pub mod traits;
//
// PostgreSQL repositories
pub mod content;
pub mod media;
//
// In-memory repositories
pub mod memory;
//
// Transaction utilities
pub mod transaction;

pub use content::PgContentRepository;
pub use media::PgMediaRepository;

use showcase_core::AppError;

/// Map a unique-constraint violation to a conflict, anything else to a
/// database error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
