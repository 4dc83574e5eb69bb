//! Showcase Core Library
//!
//! Domain models, error types, configuration and slug handling shared by every
//! crate of the corporate site backend.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod slug;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
