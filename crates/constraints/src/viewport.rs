//! The caller's display viewport.

use serde::{Deserialize, Serialize};

/// Size of the surface the video feed will be shown on, in logical pixels.
///
/// Supplied by the caller on every open so that the default aspect ratio
/// never depends on ambient window state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width / height, or `None` for a degenerate viewport.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Some(self.width / self.height)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_of_portrait_phone() {
        let vp = Viewport::new(390.0, 844.0);
        let ratio = vp.aspect_ratio().unwrap();
        assert!((ratio - 390.0 / 844.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_viewports_have_no_ratio() {
        assert_eq!(Viewport::new(0.0, 800.0).aspect_ratio(), None);
        assert_eq!(Viewport::new(800.0, 0.0).aspect_ratio(), None);
        assert_eq!(Viewport::new(f64::NAN, 1.0).aspect_ratio(), None);
    }
}
