//! The capture request tree.

use camkit_common::config::CaptureDefaults;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::merge::deep_merge;
use crate::viewport::Viewport;

/// Nested audio/video constraints describing the desired capture.
///
/// A section set to `true` or to a mapping requests that kind of track;
/// `false` or an absent section does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintsSpec {
    tree: Map<String, Value>,
}

impl ConstraintsSpec {
    /// The default tree: microphone on, configured facing mode, and an ideal
    /// aspect ratio matching the caller's viewport.
    pub fn defaults(capture: &CaptureDefaults, viewport: Viewport) -> Self {
        let ratio = viewport.aspect_ratio().unwrap_or_else(|| {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                fallback = capture.fallback_aspect_ratio,
                "Degenerate viewport; using fallback aspect ratio"
            );
            capture.fallback_aspect_ratio
        });

        let mut tree = Map::new();
        tree.insert("audio".to_string(), Value::Bool(capture.audio));
        tree.insert(
            "video".to_string(),
            json!({
                "facingMode": capture.facing_mode,
                "aspectRatio": { "ideal": ratio },
            }),
        );
        Self { tree }
    }

    /// Apply caller overrides on top of this tree.
    pub fn merge_overrides(&mut self, overrides: &Map<String, Value>) -> &mut Self {
        deep_merge(&mut self.tree, overrides);
        self
    }

    /// Builder-style variant of [`Self::merge_overrides`].
    pub fn merged(mut self, overrides: Option<&Map<String, Value>>) -> Self {
        if let Some(overrides) = overrides {
            self.merge_overrides(overrides);
        }
        self
    }

    pub fn wants_audio(&self) -> bool {
        requests_track(self.tree.get("audio"))
    }

    pub fn wants_video(&self) -> bool {
        requests_track(self.tree.get("video"))
    }

    /// `video.facingMode`, when given as a plain string.
    pub fn facing_mode(&self) -> Option<&str> {
        self.tree.get("video")?.get("facingMode")?.as_str()
    }

    /// `video.aspectRatio.ideal`, or a bare numeric `video.aspectRatio`.
    pub fn ideal_aspect_ratio(&self) -> Option<f64> {
        let ratio = self.tree.get("video")?.get("aspectRatio")?;
        ratio
            .as_f64()
            .or_else(|| ratio.get("ideal").and_then(Value::as_f64))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.tree
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.tree.clone())
    }
}

fn requests_track(section: Option<&Value>) -> bool {
    match section {
        Some(Value::Bool(enabled)) => *enabled,
        Some(Value::Object(_)) => true,
        _ => false,
    }
}
