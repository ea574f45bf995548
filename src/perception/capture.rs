use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::config::CaptureConfig;
use crate::errors::{RoverError, RoverResult};

pub const PNG_MEDIA_TYPE: &str = "image/png";

/// One still image from the robot camera, PNG encoded.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: PNG_MEDIA_TYPE,
            captured_at: Utc::now(),
        }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Source of camera frames. Every call produces a fresh frame.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> RoverResult<Frame>;
}

/// Runs an external still-capture program and normalizes its stdout image
/// to a fixed-size PNG.
pub struct CommandFrameSource {
    config: CaptureConfig,
}

impl CommandFrameSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FrameSource for CommandFrameSource {
    async fn capture(&self) -> RoverResult<Frame> {
        tracing::debug!(command = %self.config.command, args = ?self.config.args, "capturing frame");
        let output = tokio::process::Command::new(&self.config.command)
            .args(&self.config.args)
            .output()
            .await
            .map_err(|e| RoverError::CaptureFailed(format!("spawn {}: {e}", self.config.command)))?;

        if !output.status.success() {
            return Err(RoverError::CaptureFailed(format!(
                "{} exited with {}: {}",
                self.config.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let png = normalize_png(&output.stdout, self.config.width, self.config.height)?;
        tracing::info!(bytes = png.len(), "frame captured");
        Ok(Frame::png(png))
    }
}

/// Decode any supported image, resize to `width`x`height` and re-encode as PNG.
pub fn normalize_png(src_bytes: &[u8], width: u32, height: u32) -> RoverResult<Vec<u8>> {
    if src_bytes.is_empty() {
        return Err(RoverError::CaptureFailed("capture produced no image data".into()));
    }
    let img = image::load_from_memory(src_bytes)
        .map_err(|e| RoverError::CaptureFailed(format!("decode: {e}")))?;

    let resized = if img.width() == width && img.height() == height {
        img
    } else {
        img.resize_exact(width, height, image::imageops::FilterType::Triangle)
    };

    let mut png_bytes = Vec::new();
    resized
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| RoverError::CaptureFailed(format!("PNG encode: {e}")))?;
    Ok(png_bytes)
}
