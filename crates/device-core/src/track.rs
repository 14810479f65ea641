//! Media tracks and the device-access entry point.

use std::fmt;
use std::sync::Arc;

use camkit_constraints::ConstraintsSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DeviceError;

/// Kind of media a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => f.write_str("audio"),
            TrackKind::Video => f.write_str("video"),
        }
    }
}

/// Lifecycle of a track. `Ended` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Live,
    Ended,
}

/// One audio or video source handed out by the device layer.
///
/// Methods take `&self`; implementations use interior mutability so a track
/// can be shared between the session and any active recorder.
#[async_trait::async_trait]
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Human-readable device label.
    fn label(&self) -> &str;

    /// Release the underlying device. Stopping an ended track does nothing.
    fn stop(&self);

    fn ready_state(&self) -> TrackState;

    fn is_enabled(&self) -> bool;

    /// A disabled track stays live but produces silence/black frames.
    fn set_enabled(&self, enabled: bool);

    /// The raw capability set as currently reported by the device.
    fn capabilities(&self) -> Value;

    /// Ask the device to apply constraints to this track.
    async fn apply_constraints(&self, constraints: Value) -> Result<(), DeviceError>;
}

/// Tracks returned by one capture request.
#[derive(Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn into_tracks(self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tracks.iter().map(|t| (t.kind(), t.id().to_string())))
            .finish()
    }
}

/// Platform entry point for acquiring capture tracks.
#[async_trait::async_trait]
pub trait DeviceAccess: Send + Sync {
    /// Request tracks matching `constraints`. Resolves once the platform has
    /// granted (or refused) access.
    async fn request_capture(&self, constraints: &ConstraintsSpec)
        -> Result<MediaStream, DeviceError>;
}
