use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Height that keeps the aspect ratio at `target_width`, never below 1.
    pub fn height_for_width(orig_width: u32, orig_height: u32, target_width: u32) -> u32 {
        let aspect_ratio = orig_height as f64 / orig_width as f64;
        ((target_width as f64 * aspect_ratio).round() as u32).max(1)
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Downscale to `target_width`, preserving aspect ratio. Never upscales:
    /// a target at or above the source width returns an unchanged copy.
    pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        if target_width >= orig_width {
            return img.clone();
        }
        let target_height = Self::height_for_width(orig_width, orig_height, target_width);
        let filter = Self::select_filter(orig_width, orig_height, target_width, target_height);
        img.resize_exact(target_width, target_height, filter)
    }
}
