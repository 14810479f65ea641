//! Raster surfaces backed by the `image` crate.

use std::io::Cursor;

use camkit_device_core::{DeviceError, RasterEncoder, RasterSurface, VideoFeed};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, RgbaImage};

/// Encoder producing real WEBP/PNG/JPEG blobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRasterEncoder {
    produce_nothing: bool,
}

impl ImageRasterEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder whose surfaces never produce output.
    pub fn producing_nothing() -> Self {
        Self {
            produce_nothing: true,
        }
    }
}

impl RasterEncoder for ImageRasterEncoder {
    fn create_surface(&self, width: u32, height: u32) -> Box<dyn RasterSurface> {
        Box::new(ImageSurface {
            canvas: RgbaImage::new(width, height),
            produce_nothing: self.produce_nothing,
        })
    }
}

struct ImageSurface {
    canvas: RgbaImage,
    produce_nothing: bool,
}

#[async_trait::async_trait]
impl RasterSurface for ImageSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn draw_frame(&mut self, feed: &dyn VideoFeed) -> Result<(), DeviceError> {
        let frame = feed
            .current_frame()
            .ok_or_else(|| DeviceError::Other("feed has no current frame".to_string()))?;
        let (width, height) = (frame.width, frame.height);
        let image: RgbaImage = ImageBuffer::from_raw(width, height, frame.rgba).ok_or_else(|| {
            DeviceError::Other(format!("frame buffer does not match {width}x{height}"))
        })?;
        image::imageops::replace(&mut self.canvas, &image, 0, 0);
        Ok(())
    }

    async fn encode(&self, mime_type: &str, quality: f32) -> Result<Option<Vec<u8>>, DeviceError> {
        if self.produce_nothing {
            return Ok(None);
        }

        let (width, height) = self.canvas.dimensions();
        let mut out = Cursor::new(Vec::new());
        let result = match mime_type {
            "image/webp" => {
                if quality < 1.0 {
                    tracing::debug!(quality, "Lossy WEBP unavailable; encoding lossless");
                }
                WebPEncoder::new_lossless(&mut out).write_image(
                    self.canvas.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
            }
            "image/png" => PngEncoder::new(&mut out).write_image(
                self.canvas.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            "image/jpeg" => {
                let rgb = DynamicImage::ImageRgba8(self.canvas.clone()).to_rgb8();
                let quality = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
                JpegEncoder::new_with_quality(&mut out, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            other => {
                tracing::warn!(mime_type = other, "Unsupported image type requested");
                return Ok(None);
            }
        };

        result.map_err(|e| DeviceError::Other(format!("{mime_type} encoding failed: {e}")))?;
        Ok(Some(out.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PatternFeed;

    #[tokio::test]
    async fn webp_output_has_riff_header() {
        let feed = PatternFeed::new(32, 16);
        let mut surface = ImageRasterEncoder::new().create_surface(32, 16);
        surface.draw_frame(&feed).unwrap();

        let bytes = surface.encode("image/webp", 1.0).await.unwrap().unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 50, 50, 255]);
    }

    #[tokio::test]
    async fn unknown_mime_type_produces_nothing() {
        let surface = ImageRasterEncoder::new().create_surface(4, 4);
        assert_eq!(surface.encode("image/tiff", 1.0).await.unwrap(), None);
    }

    #[test]
    fn blank_feed_cannot_be_drawn() {
        let mut surface = ImageRasterEncoder::new().create_surface(4, 4);
        assert!(surface.draw_frame(&PatternFeed::blank()).is_err());
    }
}
