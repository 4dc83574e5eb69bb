//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use showcase_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so the
/// media pipeline never depends on where bytes actually live.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key`, replacing anything already there, and return
    /// the public URL of the object.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Read an object by key
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// All keys under `prefix`, sorted.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Public URL for a key; does not check existence.
    fn url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape the storage root on any backend.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::ErrorMetadata;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("media/division/2026/10/abc.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("media\\..\\x").is_err());
    }

    #[test]
    fn test_storage_error_maps_to_generic_app_error() {
        let err: AppError = StorageError::UploadFailed("bucket unreachable".to_string()).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.client_message(), "Operation failed");

        let err: AppError = StorageError::NotFound("media/x.jpg".to_string()).into();
        assert_eq!(err.http_status_code(), 404);
    }
}
