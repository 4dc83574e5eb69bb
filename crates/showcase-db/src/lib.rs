//! Showcase persistence layer
//!
//! Repository traits for media and site content, their PostgreSQL
//! implementations, and in-memory implementations for tests and local runs
//! without a database.

pub mod db;

pub use db::memory::{InMemoryContentRepository, InMemoryMediaRepository};
pub use db::traits::{ContentRepository, DivisionRecord, MediaRepository};
pub use db::{PgContentRepository, PgMediaRepository};
