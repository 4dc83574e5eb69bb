//! Generated image fixtures.

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 60, 30])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode fixture");
    out.into_inner()
}
