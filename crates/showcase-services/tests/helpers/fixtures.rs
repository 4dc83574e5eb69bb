//! Generated media fixtures.

use image::{DynamicImage, ImageFormat, RgbImage};
use showcase_services::IncomingFile;
use std::io::Cursor;

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode fixture");
    out.into_inner()
}

pub fn png_file(name: &str, width: u32, height: u32) -> IncomingFile {
    IncomingFile::new(name, "image/png", png(width, height))
}

pub fn mp4_file(name: &str) -> IncomingFile {
    IncomingFile::new(name, "video/mp4", b"\x00\x00\x00\x18ftypmp42".to_vec())
}
