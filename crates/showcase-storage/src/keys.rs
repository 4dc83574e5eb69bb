//! Shared key generation for storage backends.
//!
//! Key format: `media/{owner-type}/{YYYY}/{MM}/{hashed-name}`.

use chrono::{DateTime, Datelike, Utc};
use showcase_core::constants::MEDIA_ROOT;
use showcase_core::models::OwnerType;
use uuid::Uuid;

/// Produces collision-resistant stored filenames.
///
/// The token is a UUIDv7 rendered as 32 lowercase hex characters: time-ordered
/// for cheap chronological listing, with enough random bits that two calls
/// never collide, even across processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNamer;

impl FileNamer {
    /// `{32-hex}.{ext}` with the original extension lowercased.
    /// Filenames without an extension produce a bare token.
    pub fn name(&self, original_filename: &str) -> String {
        let token = Uuid::now_v7().simple().to_string();
        match extension_of(original_filename) {
            Some(ext) => format!("{}.{}", token, ext),
            None => token,
        }
    }
}

/// Lowercased extension of a filename, if it has a non-empty one.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Full storage key for a freshly named file.
pub fn media_key(owner_type: OwnerType, at: DateTime<Utc>, hashed_name: &str) -> String {
    format!(
        "{}/{}/{:04}/{:02}/{}",
        MEDIA_ROOT,
        owner_type.as_str(),
        at.year(),
        at.month(),
        hashed_name
    )
}
