//! Showcase Infrastructure Library
//!
//! Shared infrastructure for the site backend:
//! - Content cache abstraction with an in-process LRU backend
//! - Telemetry initialization
//! - HTTP error response body

pub mod cache;
pub mod error;
pub mod telemetry;

// Re-export commonly used types
pub use cache::{Cache, CacheError, CacheResult, InMemoryCache};
pub use error::ErrorResponse;
pub use telemetry::init_telemetry;
