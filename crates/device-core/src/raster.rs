//! Off-screen raster surfaces and still-image encoding.

use crate::error::DeviceError;

/// One decoded RGBA8 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Whether the buffer length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.rgba.len() as u64 == self.width as u64 * self.height as u64 * 4
    }
}

/// A live video feed (the element a preview is rendered into).
pub trait VideoFeed: Send + Sync {
    /// Native width of the feed, 0 until the first frame has arrived.
    fn video_width(&self) -> u32;

    /// Native height of the feed, 0 until the first frame has arrived.
    fn video_height(&self) -> u32;

    /// The frame currently being displayed.
    fn current_frame(&self) -> Option<VideoFrame>;
}

/// A drawable surface that can be encoded to an image blob.
#[async_trait::async_trait]
pub trait RasterSurface: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Draw the feed's current frame at the surface origin.
    fn draw_frame(&mut self, feed: &dyn VideoFeed) -> Result<(), DeviceError>;

    /// Encode the surface. `quality` is in `[0.0, 1.0]`; encoders that support
    /// it treat 1.0 as lossless. `Ok(None)` means the encoder produced nothing.
    async fn encode(&self, mime_type: &str, quality: f32) -> Result<Option<Vec<u8>>, DeviceError>;
}

/// Factory for off-screen surfaces.
pub trait RasterEncoder: Send + Sync {
    fn create_surface(&self, width: u32, height: u32) -> Box<dyn RasterSurface>;
}
