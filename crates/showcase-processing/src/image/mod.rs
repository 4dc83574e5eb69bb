//! Raster image operations used to build responsive derivatives.

mod encode;
mod resize;

pub use encode::{ImageEncoder, OutputFormat};
pub use resize::ImageResize;
