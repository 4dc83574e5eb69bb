use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::owner::MediaOwner;

/// Media kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            _ => Err(format!("Unknown media kind: {}", s)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Upload-time placement hint that enables the stricter image rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadContext {
    #[default]
    General,
    Hero,
    Slider,
}

impl UploadContext {
    /// Hero and slider placements require wide 16:9 images.
    pub fn requires_widescreen(self) -> bool {
        matches!(self, UploadContext::Hero | UploadContext::Slider)
    }
}

impl FromStr for UploadContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "general" => Ok(UploadContext::General),
            "hero" => Ok(UploadContext::Hero),
            "slider" => Ok(UploadContext::Slider),
            other => Err(format!("Unknown upload context: {}", other)),
        }
    }
}

/// One uploaded image, one uploaded video file, or one external video URL
/// attached to an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub owner: MediaOwner,
    pub kind: MediaKind,
    /// Relative storage key for uploads, the literal URL for external videos.
    pub path_or_embed: String,
    pub caption: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
    pub is_home_slider: bool,
    pub is_featured: bool,
    pub order: i32,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Media {
    /// External videos own no blobs; everything else points into storage.
    pub fn is_external(&self) -> bool {
        is_external_reference(&self.path_or_embed)
    }

    /// Storage key of the original blob, if this media owns one.
    pub fn storage_key(&self) -> Option<&str> {
        if self.is_external() {
            None
        } else {
            Some(&self.path_or_embed)
        }
    }
}

/// Whether a `path_or_embed` value is an external URL rather than a storage key.
pub fn is_external_reference(path_or_embed: &str) -> bool {
    let lowered = path_or_embed.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://") || lowered.starts_with("//")
}

/// Row to insert for a freshly stored media item.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub owner: MediaOwner,
    pub kind: MediaKind,
    pub path_or_embed: String,
    pub caption: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
    pub is_home_slider: bool,
    pub is_featured: bool,
    pub order: i32,
    pub uploaded_by: Uuid,
}

/// Editable presentation fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaUpdate {
    pub caption: Option<String>,
    pub is_home_slider: Option<bool>,
    pub is_featured: Option<bool>,
}

impl MediaUpdate {
    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.is_home_slider.is_none() && self.is_featured.is_none()
    }

    pub fn apply(&self, media: &mut Media) {
        if let Some(caption) = &self.caption {
            media.caption = caption.clone();
        }
        if let Some(flag) = self.is_home_slider {
            media.is_home_slider = flag;
        }
        if let Some(flag) = self.is_featured {
            media.is_featured = flag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_reference_detection() {
        assert!(is_external_reference("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_external_reference("HTTP://vimeo.com/123"));
        assert!(!is_external_reference("media/division/2026/10/abc.jpg"));
    }

    #[test]
    fn test_upload_context_parse() {
        assert_eq!("".parse::<UploadContext>(), Ok(UploadContext::General));
        assert_eq!("Hero".parse::<UploadContext>(), Ok(UploadContext::Hero));
        assert!(UploadContext::Slider.requires_widescreen());
        assert!(!UploadContext::General.requires_widescreen());
        assert!("banner".parse::<UploadContext>().is_err());
    }

    #[test]
    fn test_media_update_only_touches_given_fields() {
        let now = Utc::now();
        let mut media = Media {
            id: Uuid::new_v4(),
            owner: MediaOwner::Client(Uuid::new_v4()),
            kind: MediaKind::Image,
            path_or_embed: "media/client/2026/10/a.png".to_string(),
            caption: "logo.png".to_string(),
            width: Some(10),
            height: Some(10),
            bytes: Some(100),
            is_home_slider: false,
            is_featured: true,
            order: 1,
            uploaded_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let update = MediaUpdate {
            is_home_slider: Some(true),
            ..Default::default()
        };
        update.apply(&mut media);
        assert!(media.is_home_slider);
        assert!(media.is_featured);
        assert_eq!(media.caption, "logo.png");
    }
}
