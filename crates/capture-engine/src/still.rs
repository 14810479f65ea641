//! Still frame capture from a live video feed.

use std::sync::Arc;

use camkit_common::config::PhotoConfig;
use camkit_common::error::{CamkitError, CamkitResult};
use camkit_device_core::{RasterEncoder, VideoFeed};
use serde::Serialize;

/// One encoded still image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedImage {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// Wall-clock capture time (RFC 3339).
    pub captured_at: String,
}

/// Grabs the current frame of a feed at its native resolution.
pub struct StillCapture {
    encoder: Arc<dyn RasterEncoder>,
    config: PhotoConfig,
}

impl StillCapture {
    pub fn new(encoder: Arc<dyn RasterEncoder>, config: PhotoConfig) -> Self {
        Self { encoder, config }
    }

    pub fn config(&self) -> &PhotoConfig {
        &self.config
    }

    /// Encode the frame currently shown by `feed`.
    ///
    /// Fails with `InvalidArgument` before touching the encoder when the feed
    /// has no known size, and with `Encode` when the encoder yields nothing.
    pub async fn take_photo(&self, feed: &dyn VideoFeed) -> CamkitResult<EncodedImage> {
        let (width, height) = (feed.video_width(), feed.video_height());
        if width == 0 || height == 0 {
            return Err(CamkitError::invalid_argument(format!(
                "video feed has no frame size yet ({width}x{height})"
            )));
        }

        let mut surface = self.encoder.create_surface(width, height);
        surface
            .draw_frame(feed)
            .map_err(|e| CamkitError::encode(format!("could not render frame: {e}")))?;

        let quality = self.config.quality.clamp(0.0, 1.0);
        let bytes = surface
            .encode(&self.config.mime_type, quality)
            .await
            .map_err(|e| CamkitError::encode(e.to_string()))?
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| {
                CamkitError::encode(format!("encoder produced no {} output", self.config.mime_type))
            })?;

        tracing::info!(
            width,
            height,
            mime_type = %self.config.mime_type,
            bytes = bytes.len(),
            "Captured still frame"
        );

        Ok(EncodedImage {
            bytes,
            mime_type: self.config.mime_type.clone(),
            width,
            height,
            captured_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camkit_device_synthetic::{ImageRasterEncoder, PatternFeed};

    #[tokio::test]
    async fn photo_is_lossless_webp_at_native_size() {
        let capture = StillCapture::new(Arc::new(ImageRasterEncoder::new()), PhotoConfig::default());
        let photo = capture.take_photo(&PatternFeed::new(40, 30)).await.unwrap();

        assert_eq!(photo.mime_type, "image/webp");
        assert_eq!((photo.width, photo.height), (40, 30));
        assert_eq!(&photo.bytes[8..12], b"WEBP");
    }

    #[tokio::test]
    async fn configured_format_is_used() {
        let config = PhotoConfig {
            mime_type: "image/png".to_string(),
            quality: 1.0,
        };
        let capture = StillCapture::new(Arc::new(ImageRasterEncoder::new()), config);
        let photo = capture.take_photo(&PatternFeed::new(8, 8)).await.unwrap();
        assert_eq!(&photo.bytes[1..4], b"PNG");
    }

    #[tokio::test]
    async fn empty_encoder_output_is_an_encode_error() {
        let capture = StillCapture::new(
            Arc::new(ImageRasterEncoder::producing_nothing()),
            PhotoConfig::default(),
        );
        let err = capture.take_photo(&PatternFeed::new(8, 8)).await.unwrap_err();
        assert!(matches!(err, CamkitError::Encode { .. }));
    }
}
