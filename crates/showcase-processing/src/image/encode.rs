use crate::error::DerivativeError;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Encodes derivatives: JPEG through mozjpeg, WebP through libwebp, PNG
/// through the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImageEncoder {
    jpeg_quality: u8,
    webp_quality: f32,
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new(82, 80.0)
    }
}

impl ImageEncoder {
    pub fn new(jpeg_quality: u8, webp_quality: f32) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            webp_quality: webp_quality.clamp(1.0, 100.0),
        }
    }

    pub fn encode(&self, img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, DerivativeError> {
        match format {
            OutputFormat::Jpeg => self.encode_jpeg(img),
            OutputFormat::Png => Self::encode_png(img),
            OutputFormat::WebP => Ok(self.encode_webp(img)),
        }
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>, DerivativeError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(self.jpeg_quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(&rgb_img)?;
        let jpeg_data = comp.finish()?;

        Ok(jpeg_data)
    }

    fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, DerivativeError> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| DerivativeError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn encode_webp(&self, img: &DynamicImage) -> Vec<u8> {
        let (width, height) = img.dimensions();
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        encoder.encode(self.webp_quality).to_vec()
    }
}
