//! Chunked media recorders.
//!
//! A recorder reports through an event channel instead of callbacks: zero or
//! more [`RecorderEvent::Data`] chunks in emission order, then exactly one
//! terminal [`RecorderEvent::Stop`] or [`RecorderEvent::Error`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::DeviceError;
use crate::track::MediaTrack;

/// Notification emitted by a running recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// An encoded chunk is available.
    Data(Vec<u8>),
    /// The recorder has flushed its last chunk and stopped.
    Stop,
    /// The recorder failed and will emit nothing further.
    Error(String),
}

pub type RecorderEventSender = mpsc::UnboundedSender<RecorderEvent>;
pub type RecorderEventReceiver = mpsc::UnboundedReceiver<RecorderEvent>;

/// Create the channel a recorder reports through.
pub fn recorder_event_channel() -> (RecorderEventSender, RecorderEventReceiver) {
    mpsc::unbounded_channel()
}

/// Container/codec and bitrate selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderOptions {
    /// e.g. `video/webm;codecs=vp9,opus`.
    pub mime_type: String,
    pub video_bits_per_second: Option<u32>,
    pub audio_bits_per_second: Option<u32>,
}

/// Recorder-side state as reported by the implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Inactive,
    Recording,
}

/// A recorder bound to a fixed set of tracks.
pub trait ChunkedRecorder: Send {
    /// Begin recording. With a `timeslice`, a chunk is emitted roughly every
    /// interval; without one, a single chunk is emitted on stop.
    fn start(&mut self, timeslice: Option<Duration>) -> Result<(), DeviceError>;

    /// Request stop. The final chunk and [`RecorderEvent::Stop`] arrive on
    /// the event channel afterwards.
    fn stop(&mut self) -> Result<(), DeviceError>;

    fn state(&self) -> RecorderState;
}

/// Builds recorders and reports which containers are available.
pub trait RecorderFactory: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn create(
        &self,
        tracks: &[Arc<dyn MediaTrack>],
        options: &RecorderOptions,
        events: RecorderEventSender,
    ) -> Result<Box<dyn ChunkedRecorder>, DeviceError>;
}
