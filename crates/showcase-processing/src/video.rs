//! Video thumbnail frame extraction.

use crate::error::DerivativeError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Produces a single JPEG frame from a video file.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frame(&self, video: &[u8]) -> Result<Vec<u8>, DerivativeError>;
}

/// Extracts the first frame with the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg_path: String,
}

impl FfmpegFrameExtractor {
    pub fn new(ffmpeg_path: String) -> Result<Self, DerivativeError> {
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.trim().is_empty() || ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(DerivativeError::FrameExtraction(
                "Invalid ffmpeg_path: contains dangerous characters".to_string(),
            ));
        }

        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(&self, video: &[u8]) -> Result<Vec<u8>, DerivativeError> {
        let input = tempfile::Builder::new().suffix(".mp4").tempfile()?;
        tokio::fs::write(input.path(), video).await?;
        let output = tempfile::Builder::new().suffix(".jpg").tempfile()?;

        let start = std::time::Instant::now();
        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input.path())
            .args(["-frames:v", "1", "-q:v", "2", "-y"])
            .arg(output.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DerivativeError::FrameExtraction(format!("Failed to execute ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DerivativeError::FrameExtraction(stderr.trim().to_string()));
        }

        let frame = tokio::fs::read(output.path()).await?;
        if frame.is_empty() {
            return Err(DerivativeError::FrameExtraction(
                "ffmpeg produced an empty frame".to_string(),
            ));
        }

        tracing::debug!(
            size_bytes = frame.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Extracted video thumbnail frame"
        );

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_shell_metacharacters() {
        assert!(FfmpegFrameExtractor::new("ffmpeg; rm -rf /".to_string()).is_err());
        assert!(FfmpegFrameExtractor::new("".to_string()).is_err());
        assert!(FfmpegFrameExtractor::new("/usr/bin/ffmpeg".to_string()).is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_frame_error() {
        let extractor =
            FfmpegFrameExtractor::new("/nonexistent/showcase-ffmpeg".to_string()).unwrap();
        let err = extractor.extract_frame(b"not a video").await.unwrap_err();
        assert!(matches!(err, DerivativeError::FrameExtraction(_)));
    }
}
