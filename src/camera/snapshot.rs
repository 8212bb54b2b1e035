//! Grab the current frame of a stream and encode it as JPEG.

use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use thiserror::Error;

use super::backend::CameraStream;
use super::types::Frame;
use crate::compare::ImagePayload;

/// Default JPEG quality for captured frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// File name sent with camera captures.
pub const CAPTURE_FILE_NAME: &str = "capture.jpg";

const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("aucune image de la caméra pour l'instant")]
    NoFrame,

    #[error("image de la caméra vide ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("aucune image de la caméra après {0:?}")]
    Timeout(Duration),

    #[error("encodage JPEG impossible : {0}")]
    Encode(#[from] image::ImageError),
}

/// Encodes the latest frame of a stream at a fixed JPEG quality.
#[derive(Debug, Clone, Copy)]
pub struct FrameCapturer {
    quality: u8,
}

impl Default for FrameCapturer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameCapturer {
    /// Quality is clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode the stream's current frame.
    pub fn capture<S: CameraStream + ?Sized>(&self, stream: &S) -> Result<ImagePayload, CaptureError> {
        let frame = stream.latest_frame().ok_or(CaptureError::NoFrame)?;
        self.encode(&frame)
    }

    /// Encode one frame at its native resolution.
    pub fn encode(&self, frame: &Frame) -> Result<ImagePayload, CaptureError> {
        if frame.is_degenerate() {
            return Err(CaptureError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let len = frame.width as usize * frame.height as usize * Frame::BYTES_PER_PIXEL;
        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
            encoder.encode(
                &frame.data[..len],
                frame.width,
                frame.height,
                ExtendedColorType::Rgb8,
            )?;
        }
        log::debug!(
            "Encoded {}x{} frame to {} bytes (quality {})",
            frame.width,
            frame.height,
            bytes.len(),
            self.quality
        );

        Ok(ImagePayload {
            bytes,
            file_name: CAPTURE_FILE_NAME.to_string(),
            mime: "image/jpeg".to_string(),
        })
    }
}

/// Wait until the stream has produced its first frame.
pub async fn wait_for_frame<S: CameraStream + ?Sized>(
    stream: &S,
    timeout: Duration,
) -> Result<Frame, CaptureError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(frame) = stream.latest_frame() {
            return Ok(frame);
        }
        if Instant::now() >= deadline {
            return Err(CaptureError::Timeout(timeout));
        }
        tokio::time::sleep(FRAME_POLL_INTERVAL).await;
    }
}
