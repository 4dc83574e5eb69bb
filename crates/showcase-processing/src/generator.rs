//! Responsive derivative generation.

use crate::derivatives::{is_webp, planned_widths, split_key, thumbnail_key, variant_key, webp_key};
use crate::error::{DerivativeError, DerivativeFailure, Derivatives, PartialFailure, Variant};
use crate::image::{ImageEncoder, ImageResize, OutputFormat};
use crate::video::FrameExtractor;
use image::{DynamicImage, GenericImageView, ImageReader};
use showcase_storage::Storage;
use std::io::Cursor;
use std::sync::Arc;

/// One encoded output waiting to be written.
struct EncodedOutput {
    key: String,
    /// `Some` for a resized variant in the source format.
    variant_width: Option<u32>,
    format: OutputFormat,
    data: Result<Vec<u8>, DerivativeError>,
}

/// Builds and stores derivatives next to an original.
pub struct DerivativeGenerator {
    storage: Arc<dyn Storage>,
    encoder: ImageEncoder,
    frames: Arc<dyn FrameExtractor>,
}

impl DerivativeGenerator {
    pub fn new(
        storage: Arc<dyn Storage>,
        encoder: ImageEncoder,
        frames: Arc<dyn FrameExtractor>,
    ) -> Self {
        Self {
            storage,
            encoder,
            frames,
        }
    }

    /// Resized variants at each configured width up to the source width, a
    /// WebP transcode of the original and one per variant.
    ///
    /// Decoding and encoding run on the blocking pool.
    #[tracing::instrument(skip(self, data), fields(original = %original_key))]
    pub async fn generate_image_derivatives(
        &self,
        original_key: &str,
        data: Vec<u8>,
    ) -> Result<Derivatives, PartialFailure> {
        let start = std::time::Instant::now();
        let key = original_key.to_string();
        let encoder = self.encoder;

        let outputs = tokio::task::spawn_blocking(move || encode_image_outputs(&key, &data, encoder))
            .await
            .map_err(|e| PartialFailure::total(original_key, DerivativeError::Task(e.to_string())))?
            .map_err(|e| PartialFailure::total(original_key, e))?;

        let mut produced = Derivatives::default();
        let mut failures = Vec::new();

        for output in outputs {
            let bytes = match output.data {
                Ok(bytes) => bytes,
                Err(error) => {
                    failures.push(DerivativeFailure {
                        key: output.key,
                        error,
                    });
                    continue;
                }
            };

            match self
                .storage
                .put(&output.key, output.format.to_mime_type(), bytes)
                .await
            {
                Ok(_) => match output.variant_width {
                    Some(width) => produced.variants.push(Variant {
                        width,
                        key: output.key,
                    }),
                    None => produced.webp.push(output.key),
                },
                Err(e) => failures.push(DerivativeFailure {
                    key: output.key,
                    error: e.into(),
                }),
            }
        }

        tracing::debug!(
            written = produced.len(),
            failed = failures.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image derivatives generated"
        );

        if failures.is_empty() {
            Ok(produced)
        } else {
            Err(PartialFailure { produced, failures })
        }
    }

    /// Store one frame of the video as `{base}_thumb.jpg`.
    #[tracing::instrument(skip(self, data), fields(original = %original_key))]
    pub async fn generate_video_thumbnail(
        &self,
        original_key: &str,
        data: &[u8],
    ) -> Result<Derivatives, PartialFailure> {
        let key = thumbnail_key(original_key);

        let frame = self
            .frames
            .extract_frame(data)
            .await
            .map_err(|e| PartialFailure::total(&key, e))?;

        self.storage
            .put(&key, OutputFormat::Jpeg.to_mime_type(), frame)
            .await
            .map_err(|e| PartialFailure::total(&key, e.into()))?;

        Ok(Derivatives {
            thumbnail: Some(key),
            ..Default::default()
        })
    }
}

/// Decode once, then encode every planned output. Individual encode failures
/// are kept per output so the rest can still be written.
fn encode_image_outputs(
    original_key: &str,
    data: &[u8],
    encoder: ImageEncoder,
) -> Result<Vec<EncodedOutput>, DerivativeError> {
    let source_format = split_key(original_key)
        .1
        .and_then(OutputFormat::from_extension)
        .ok_or_else(|| {
            DerivativeError::Encode(format!("Unsupported source format for {}", original_key))
        })?;

    let img = decode(data)?;
    let (width, _) = img.dimensions();
    let source_is_webp = is_webp(original_key);

    let mut outputs = Vec::new();

    for target in planned_widths(width) {
        let resized = ImageResize::resize_to_width(&img, target);
        let key = variant_key(original_key, target);

        if !source_is_webp {
            outputs.push(EncodedOutput {
                key: webp_key(&key),
                variant_width: None,
                format: OutputFormat::WebP,
                data: encoder.encode(&resized, OutputFormat::WebP),
            });
        }

        outputs.push(EncodedOutput {
            key,
            variant_width: Some(target),
            format: source_format,
            data: encoder.encode(&resized, source_format),
        });
    }

    if !source_is_webp {
        outputs.push(EncodedOutput {
            key: webp_key(original_key),
            variant_width: None,
            format: OutputFormat::WebP,
            data: encoder.encode(&img, OutputFormat::WebP),
        });
    }

    Ok(outputs)
}

fn decode(data: &[u8]) -> Result<DynamicImage, DerivativeError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| DerivativeError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| DerivativeError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageFormat, RgbImage};
    use showcase_storage::LocalStorage;
    use tempfile::tempdir;

    struct StaticFrame;

    #[async_trait]
    impl FrameExtractor for StaticFrame {
        async fn extract_frame(&self, _video: &[u8]) -> Result<Vec<u8>, DerivativeError> {
            Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
        }
    }

    struct BrokenFrame;

    #[async_trait]
    impl FrameExtractor for BrokenFrame {
        async fn extract_frame(&self, _video: &[u8]) -> Result<Vec<u8>, DerivativeError> {
            Err(DerivativeError::FrameExtraction("no video stream".to_string()))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn setup(
        dir: &std::path::Path,
        frames: Arc<dyn FrameExtractor>,
    ) -> (DerivativeGenerator, Arc<LocalStorage>) {
        let storage = Arc::new(
            LocalStorage::new(dir, "http://localhost:3000/storage".to_string())
                .await
                .unwrap(),
        );
        (
            DerivativeGenerator::new(storage.clone(), ImageEncoder::default(), frames),
            storage,
        )
    }

    #[tokio::test]
    async fn test_wide_image_gets_three_variants_and_four_webp() {
        let dir = tempdir().unwrap();
        let (generator, storage) = setup(dir.path(), Arc::new(StaticFrame)).await;
        let key = "media/division/2026/10/wide.png";
        storage.put(key, "image/png", png(2000, 1125)).await.unwrap();

        let derivatives = generator
            .generate_image_derivatives(key, png(2000, 1125))
            .await
            .unwrap();

        let widths: Vec<u32> = derivatives.variants.iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![768, 1280, 1920]);
        assert_eq!(derivatives.webp.len(), 4);

        let stored = storage.list("media/division").await.unwrap();
        assert_eq!(stored.len(), 8);
        assert!(stored.contains(&"media/division/2026/10/wide_1920w.png".to_string()));
        assert!(stored.contains(&"media/division/2026/10/wide.webp".to_string()));

        let variant = storage.get("media/division/2026/10/wide_768w.png").await.unwrap();
        assert_eq!(image::load_from_memory(&variant).unwrap().dimensions(), (768, 432));
    }

    #[tokio::test]
    async fn test_small_image_is_never_upscaled() {
        let dir = tempdir().unwrap();
        let (generator, storage) = setup(dir.path(), Arc::new(StaticFrame)).await;
        let key = "media/client/2026/10/logo.png";

        let derivatives = generator
            .generate_image_derivatives(key, png(400, 200))
            .await
            .unwrap();

        assert!(derivatives.variants.is_empty());
        assert_eq!(derivatives.webp, vec!["media/client/2026/10/logo.webp".to_string()]);
        assert!(!storage.exists("media/client/2026/10/logo_768w.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_webp_original_skips_redundant_transcode() {
        let dir = tempdir().unwrap();
        let (generator, _storage) = setup(dir.path(), Arc::new(StaticFrame)).await;
        let webp = ImageEncoder::default()
            .encode(&DynamicImage::ImageRgb8(RgbImage::new(1000, 500)), OutputFormat::WebP)
            .unwrap();

        let derivatives = generator
            .generate_image_derivatives("media/product/2026/10/shot.webp", webp)
            .await
            .unwrap();

        assert_eq!(derivatives.variants.len(), 1);
        assert_eq!(derivatives.variants[0].key, "media/product/2026/10/shot_768w.webp");
        assert!(derivatives.webp.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_source_is_partial_failure() {
        let dir = tempdir().unwrap();
        let (generator, _storage) = setup(dir.path(), Arc::new(StaticFrame)).await;

        let failure = generator
            .generate_image_derivatives("media/machine/2026/10/bad.jpg", b"garbage".to_vec())
            .await
            .unwrap_err();

        assert!(failure.produced.is_empty());
        assert_eq!(failure.failures.len(), 1);
        assert!(matches!(failure.failures[0].error, DerivativeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_video_thumbnail() {
        let dir = tempdir().unwrap();
        let (generator, storage) = setup(dir.path(), Arc::new(StaticFrame)).await;

        let derivatives = generator
            .generate_video_thumbnail("media/division/2026/10/tour.mp4", b"video")
            .await
            .unwrap();

        assert_eq!(
            derivatives.thumbnail.as_deref(),
            Some("media/division/2026/10/tour_thumb.jpg")
        );
        assert!(storage.exists("media/division/2026/10/tour_thumb.jpg").await.unwrap());

        let (generator, _) = setup(dir.path(), Arc::new(BrokenFrame)).await;
        let failure = generator
            .generate_video_thumbnail("media/division/2026/10/other.mp4", b"video")
            .await
            .unwrap_err();
        assert_eq!(failure.failures[0].key, "media/division/2026/10/other_thumb.jpg");
    }
}
