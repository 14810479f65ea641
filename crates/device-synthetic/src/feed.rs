//! Test-pattern video feed.

use std::sync::Mutex;

use camkit_device_core::{VideoFeed, VideoFrame};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::lock;

/// A feed showing a fixed test pattern, or nothing until a frame is set.
#[derive(Debug, Default)]
pub struct PatternFeed {
    frame: Mutex<Option<RgbaImage>>,
}

impl PatternFeed {
    /// Feed showing [`create_test_pattern`] at the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Mutex::new(Some(create_test_pattern(width, height))),
        }
    }

    /// Feed that has not received its first frame (reports 0x0).
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn set_frame(&self, frame: RgbaImage) {
        *lock(&self.frame) = Some(frame);
    }
}

impl VideoFeed for PatternFeed {
    fn video_width(&self) -> u32 {
        lock(&self.frame).as_ref().map(|f| f.width()).unwrap_or(0)
    }

    fn video_height(&self) -> u32 {
        lock(&self.frame).as_ref().map(|f| f.height()).unwrap_or(0)
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        lock(&self.frame).as_ref().map(|f| VideoFrame {
            width: f.width(),
            height: f.height(),
            rgba: f.as_raw().clone(),
        })
    }
}

/// Horizontal gradient with a solid marker square in each corner.
pub fn create_test_pattern(width: u32, height: u32) -> RgbaImage {
    let marker = (width.min(height) / 8).max(1);
    ImageBuffer::from_fn(width, height, |x, y| {
        let in_left = x < marker;
        let in_right = x + marker >= width;
        let in_top = y < marker;
        let in_bottom = y + marker >= height;
        match (in_left, in_right, in_top, in_bottom) {
            (true, _, true, _) => Rgba([255, 50, 50, 255]),
            (_, true, true, _) => Rgba([50, 255, 50, 255]),
            (_, true, _, true) => Rgba([50, 50, 255, 255]),
            (true, _, _, true) => Rgba([255, 255, 255, 255]),
            _ => {
                let shade = (x * 255 / width.max(1)) as u8;
                Rgba([shade, shade / 2, 64, 255])
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_feed_reports_zero_size() {
        let feed = PatternFeed::blank();
        assert_eq!(feed.video_width(), 0);
        assert_eq!(feed.video_height(), 0);
        assert!(feed.current_frame().is_none());
    }

    #[test]
    fn pattern_frame_is_well_formed() {
        let feed = PatternFeed::new(64, 48);
        let frame = feed.current_frame().unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert!(frame.is_well_formed());
        assert_eq!(&frame.rgba[..4], &[255, 50, 50, 255]);
    }
}
