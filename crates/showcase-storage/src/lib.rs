//! Showcase Storage Library
//!
//! Blob storage abstraction for uploaded media, with S3 and local filesystem
//! backends.
//!
//! # Storage key format
//!
//! Originals live at `media/{owner-type}/{YYYY}/{MM}/{32-hex}.{ext}`, where the
//! year and month are the UTC upload date. Derivatives sit next to their
//! original and are named from it, so no extra bookkeeping is needed to find
//! them again. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{media_key, FileNamer};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use showcase_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
