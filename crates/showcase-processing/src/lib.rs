//! Showcase Processing Library
//!
//! Upload validation and derivative generation for the media pipeline.

pub mod derivatives;
pub mod error;
pub mod generator;
pub mod image;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use error::{DerivativeError, DerivativeFailure, Derivatives, PartialFailure, Variant};
pub use generator::DerivativeGenerator;
pub use validator::{
    IncomingFile, MediaValidationError, MediaValidator, UploadPolicy, ValidatedFile, VideoProvider,
};
pub use video::{FfmpegFrameExtractor, FrameExtractor};
