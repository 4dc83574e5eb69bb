//! Upload validation.
//!
//! Pure checks run before any storage I/O. Every rejection is a
//! [`MediaValidationError`] whose message is safe to show to the uploader.

use image::ImageReader;
use regex::Regex;
use showcase_core::config::MediaConfig;
use showcase_core::models::{MediaKind, UploadContext};
use showcase_core::AppError;
use showcase_storage::keys::extension_of;
use std::io::Cursor;
use std::sync::LazyLock;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];


static VIDEO_URL_PATTERNS: LazyLock<Vec<(VideoProvider, Regex)>> = LazyLock::new(|| {
    [
        (
            VideoProvider::YouTube,
            r"^(?i:https?://)?(?i:www\.|m\.)?(?i:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/)|youtu\.be/)[A-Za-z0-9_-]{11}(?:[?&#/].*)?$",
        ),
        (
            VideoProvider::Vimeo,
            r"^(?i:https?://)?(?i:www\.|player\.)?(?i:vimeo\.com/)(?:video/|channels/[A-Za-z0-9_-]+/)?\d+(?:[?#/].*)?$",
        ),
    ]
    .into_iter()
    .filter_map(|(provider, pattern)| match Regex::new(pattern) {
        Ok(re) => Some((provider, re)),
        Err(e) => {
            tracing::error!(error = %e, provider = ?provider, "Invalid video URL pattern");
            None
        }
    })
    .collect()
});

/// Reasons an upload is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaValidationError {
    #[error("The uploaded file is empty")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File name has no extension: {0}")]
    MissingExtension(String),

    #[error("Unsupported file type .{extension} (allowed: {allowed})")]
    InvalidExtension { extension: String, allowed: String },

    #[error("Content type {content_type} does not match the .{extension} extension")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("The image could not be read: {0}")]
    UnreadableImage(String),

    #[error("Image is {width}x{height}px; images may be at most {max}x{max}px")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("Hero and slider images must be at least {min_width}px wide (this one is {width}px)")]
    TooNarrow { width: u32, min_width: u32 },

    #[error("Hero and slider images must have a 16:9 aspect ratio (this one is {width}x{height}px)")]
    WrongAspectRatio { width: u32, height: u32 },

    #[error("Invalid video URL: only YouTube and Vimeo URLs are allowed.")]
    UnsupportedVideoUrl,
}

impl From<MediaValidationError> for AppError {
    fn from(err: MediaValidationError) -> Self {
        AppError::MediaValidation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
    YouTube,
    Vimeo,
}

/// A file received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// A known extension wins; otherwise video when the declared type says so.
    pub fn detect_kind(&self) -> MediaKind {
        let ext = extension_of(&self.filename);
        match ext.as_deref() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => return MediaKind::Image,
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => return MediaKind::Video,
            _ => {}
        }
        if self.content_type.to_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// Facts established while validating, reused by the store step.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFile {
    pub kind: MediaKind,
    pub extension: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: u64,
}

/// Limits applied to uploads
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub image_max_file_size: u64,
    pub image_max_dimension: u32,
    pub hero_min_width: u32,
    /// Fraction of 16/9 that a hero image ratio may deviate by.
    pub hero_aspect_tolerance: f64,
    pub video_max_file_size: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

impl UploadPolicy {
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            image_max_file_size: config.image_max_file_size_bytes,
            image_max_dimension: config.image_max_dimension,
            hero_min_width: config.hero_min_width,
            hero_aspect_tolerance: config.hero_aspect_tolerance,
            video_max_file_size: config.video_max_file_size_bytes,
        }
    }
}

/// Media file validator
#[derive(Debug, Clone, Default)]
pub struct MediaValidator {
    policy: UploadPolicy,
}

impl MediaValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate an uploaded file of the given kind.
    pub fn validate(
        &self,
        file: &IncomingFile,
        kind: MediaKind,
        context: UploadContext,
    ) -> Result<ValidatedFile, MediaValidationError> {
        match kind {
            MediaKind::Image => self.validate_image(file, context),
            MediaKind::Video => self.validate_video_file(file),
        }
    }

    pub fn validate_image(
        &self,
        file: &IncomingFile,
        context: UploadContext,
    ) -> Result<ValidatedFile, MediaValidationError> {
        let extension = validate_extension(&file.filename, IMAGE_EXTENSIONS)?;
        validate_file_size(file.size(), self.policy.image_max_file_size)?;
        validate_extension_content_type_match(&extension, &file.content_type)?;

        let (width, height) = read_dimensions(&file.data)?;
        let max = self.policy.image_max_dimension;
        if width > max || height > max {
            return Err(MediaValidationError::DimensionsTooLarge { width, height, max });
        }

        if context.requires_widescreen() {
            self.check_widescreen(width, height)?;
        }

        Ok(ValidatedFile {
            kind: MediaKind::Image,
            extension,
            width: Some(width),
            height: Some(height),
            bytes: file.size(),
        })
    }

    pub fn validate_video_file(
        &self,
        file: &IncomingFile,
    ) -> Result<ValidatedFile, MediaValidationError> {
        let extension = validate_extension(&file.filename, VIDEO_EXTENSIONS)?;
        validate_file_size(file.size(), self.policy.video_max_file_size)?;
        validate_extension_content_type_match(&extension, &file.content_type)?;

        Ok(ValidatedFile {
            kind: MediaKind::Video,
            extension,
            width: None,
            height: None,
            bytes: file.size(),
        })
    }

    pub fn validate_video_url(&self, url: &str) -> Result<VideoProvider, MediaValidationError> {
        let url = url.trim();
        VIDEO_URL_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(url))
            .map(|(provider, _)| *provider)
            .ok_or(MediaValidationError::UnsupportedVideoUrl)
    }

    /// Width floor first so a narrow image gets the more actionable message.
    fn check_widescreen(&self, width: u32, height: u32) -> Result<(), MediaValidationError> {
        if width < self.policy.hero_min_width {
            return Err(MediaValidationError::TooNarrow {
                width,
                min_width: self.policy.hero_min_width,
            });
        }

        // |w/h - 16/9| <= tol * 16/9, scaled by 9h so the edges stay exact
        let deviation = (9.0 * width as f64 - 16.0 * height as f64).abs();
        if deviation > self.policy.hero_aspect_tolerance * 16.0 * height as f64 {
            return Err(MediaValidationError::WrongAspectRatio { width, height });
        }

        Ok(())
    }
}

fn validate_file_size(size: u64, max: u64) -> Result<(), MediaValidationError> {
    if size == 0 {
        return Err(MediaValidationError::EmptyFile);
    }
    if size > max {
        return Err(MediaValidationError::FileTooLarge { size, max });
    }
    Ok(())
}

fn validate_extension(filename: &str, allowed: &[&str]) -> Result<String, MediaValidationError> {
    let extension = extension_of(filename)
        .ok_or_else(|| MediaValidationError::MissingExtension(filename.to_string()))?;

    if !allowed.contains(&extension.as_str()) {
        return Err(MediaValidationError::InvalidExtension {
            extension,
            allowed: allowed.join(", "),
        });
    }

    Ok(extension)
}

/// Reject a declared content type that contradicts the extension.
///
/// Generic types (`application/octet-stream` or none) carry no claim and pass;
/// the image header check still catches non-images.
fn validate_extension_content_type_match(
    extension: &str,
    content_type: &str,
) -> Result<(), MediaValidationError> {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if normalized.is_empty() || normalized == "application/octet-stream" {
        return Ok(());
    }

    let expected: &[&str] = match extension {
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg", "image/pjpeg"],
        "png" => &["image/png"],
        "webp" => &["image/webp"],
        "mp4" => &["video/mp4"],
        _ => return Ok(()),
    };

    if !expected.contains(&normalized.as_str()) {
        return Err(MediaValidationError::ContentTypeMismatch {
            content_type: content_type.to_string(),
            extension: extension.to_string(),
        });
    }

    Ok(())
}

/// Read width and height from the image header without decoding pixels.
fn read_dimensions(data: &[u8]) -> Result<(u32, u32), MediaValidationError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MediaValidationError::UnreadableImage(e.to_string()))?
        .into_dimensions()
        .map_err(|e| MediaValidationError::UnreadableImage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn image_file(width: u32, height: u32) -> IncomingFile {
        IncomingFile::new("banner.png", "image/png", png(width, height))
    }

    #[test]
    fn test_hero_accepts_wide_16_9() {
        let validator = MediaValidator::default();
        let validated = validator
            .validate(&image_file(1920, 1080), MediaKind::Image, UploadContext::Hero)
            .unwrap();
        assert_eq!(validated.width, Some(1920));
        assert_eq!(validated.height, Some(1080));
        assert_eq!(validated.extension, "png");
    }

    #[test]
    fn test_hero_rejects_narrow_image() {
        let validator = MediaValidator::default();
        let err = validator
            .validate(&image_file(1024, 576), MediaKind::Image, UploadContext::Hero)
            .unwrap_err();
        assert!(matches!(err, MediaValidationError::TooNarrow { .. }));
        assert!(err.to_string().contains("at least 1200px wide"));
    }

    #[test]
    fn test_slider_rejects_wrong_ratio() {
        let validator = MediaValidator::default();
        let err = validator
            .validate(&image_file(1600, 1200), MediaKind::Image, UploadContext::Slider)
            .unwrap_err();
        assert!(err.to_string().contains("16:9 aspect ratio"));
    }

    #[test]
    fn test_aspect_tolerance_band_edges() {
        let validator = MediaValidator::default();
        // 1.9:1 is inside the 10% band, 2.0:1 is outside
        assert!(validator
            .validate(&image_file(1900, 1000), MediaKind::Image, UploadContext::Hero)
            .is_ok());
        assert!(validator
            .validate(&image_file(2000, 1000), MediaKind::Image, UploadContext::Hero)
            .is_err());
    }

    #[test]
    fn test_aspect_band_edges_are_inclusive() {
        let validator = MediaValidator::default();
        // exactly 1.1x and 0.9x of 16:9
        for (width, height) in [(1760, 900), (1232, 630), (1320, 675), (1408, 720), (1440, 900)] {
            assert!(
                validator
                    .validate(&image_file(width, height), MediaKind::Image, UploadContext::Hero)
                    .is_ok(),
                "{width}x{height} should be accepted"
            );
        }
        let err = validator
            .validate(&image_file(1761, 900), MediaKind::Image, UploadContext::Hero)
            .unwrap_err();
        assert!(matches!(err, MediaValidationError::WrongAspectRatio { .. }));
    }

    #[test]
    fn test_general_context_skips_widescreen_rules() {
        let validator = MediaValidator::default();
        assert!(validator
            .validate(&image_file(400, 400), MediaKind::Image, UploadContext::General)
            .is_ok());
    }

    #[test]
    fn test_image_limits() {
        let validator = MediaValidator::new(UploadPolicy {
            image_max_file_size: 64,
            ..UploadPolicy::default()
        });
        let err = validator
            .validate(&image_file(200, 200), MediaKind::Image, UploadContext::General)
            .unwrap_err();
        assert!(matches!(err, MediaValidationError::FileTooLarge { .. }));

        let validator = MediaValidator::new(UploadPolicy {
            image_max_dimension: 100,
            ..UploadPolicy::default()
        });
        let err = validator
            .validate(&image_file(200, 50), MediaKind::Image, UploadContext::General)
            .unwrap_err();
        assert!(matches!(err, MediaValidationError::DimensionsTooLarge { .. }));
    }

    #[test]
    fn test_extension_and_content_type() {
        let validator = MediaValidator::default();
        let gif = IncomingFile::new("anim.gif", "image/gif", png(10, 10));
        assert!(matches!(
            validator.validate(&gif, MediaKind::Image, UploadContext::General),
            Err(MediaValidationError::InvalidExtension { .. })
        ));

        let spoofed = IncomingFile::new("photo.png", "video/mp4", png(10, 10));
        assert!(matches!(
            validator.validate(&spoofed, MediaKind::Image, UploadContext::General),
            Err(MediaValidationError::ContentTypeMismatch { .. })
        ));

        let not_an_image = IncomingFile::new("photo.jpg", "image/jpeg", b"hello".to_vec());
        assert!(matches!(
            validator.validate(&not_an_image, MediaKind::Image, UploadContext::General),
            Err(MediaValidationError::UnreadableImage(_))
        ));
    }

    #[test]
    fn test_video_file_rules() {
        let validator = MediaValidator::new(UploadPolicy {
            video_max_file_size: 8,
            ..UploadPolicy::default()
        });
        let ok = IncomingFile::new("tour.MP4", "video/mp4", vec![0; 8]);
        assert_eq!(
            validator.validate(&ok, MediaKind::Video, UploadContext::General).unwrap().kind,
            MediaKind::Video
        );

        let big = IncomingFile::new("tour.mp4", "video/mp4", vec![0; 9]);
        assert!(validator.validate_video_file(&big).is_err());

        let mov = IncomingFile::new("tour.mov", "video/quicktime", vec![0; 4]);
        assert!(validator.validate_video_file(&mov).is_err());

        let empty = IncomingFile::new("tour.mp4", "video/mp4", vec![]);
        assert_eq!(
            validator.validate_video_file(&empty),
            Err(MediaValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_video_url_providers() {
        let validator = MediaValidator::default();
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtube.com/embed/dQw4w9WgXcQ?start=10",
        ] {
            assert_eq!(validator.validate_video_url(url), Ok(VideoProvider::YouTube), "{url}");
        }
        for url in ["https://vimeo.com/76979871", "https://player.vimeo.com/video/76979871"] {
            assert_eq!(validator.validate_video_url(url), Ok(VideoProvider::Vimeo), "{url}");
        }

        let err = validator
            .validate_video_url("https://www.dailymotion.com/video/x7tgad0")
            .unwrap_err();
        assert!(err.to_string().contains("only YouTube and Vimeo URLs are allowed."));
        assert!(validator
            .validate_video_url("https://evil.example/youtube.com/watch?v=dQw4w9WgXcQ")
            .is_err());
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            IncomingFile::new("a.mp4", "", vec![1]).detect_kind(),
            MediaKind::Video
        );
        assert_eq!(
            IncomingFile::new("a.jpg", "image/jpeg", vec![1]).detect_kind(),
            MediaKind::Image
        );
        assert_eq!(
            IncomingFile::new("clip", "video/mp4", vec![1]).detect_kind(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_image_extension_with_video_type_reports_mismatch() {
        let file = IncomingFile::new("photo.jpg", "video/mp4", png(10, 10));
        assert_eq!(file.detect_kind(), MediaKind::Image);

        let err = MediaValidator::default()
            .validate(&file, file.detect_kind(), UploadContext::General)
            .unwrap_err();
        assert!(matches!(err, MediaValidationError::ContentTypeMismatch { .. }));
    }

    #[test]
    fn test_validation_error_becomes_user_facing_app_error() {
        let err: AppError = MediaValidationError::UnsupportedVideoUrl.into();
        assert!(matches!(err, AppError::MediaValidation(ref msg) if msg.contains("YouTube")));
    }
}
