//! Chunked video recording.
//!
//! A [`RecordingSession`] owns the recorder's event stream and the chunk
//! buffer. Chunks are appended in the order the recorder emits them; the
//! single [`RecordingSession::stop`] call assembles them into one blob.
//!
//! ```text
//!   start ──► Recording ──stop()──► Stopping ──Stop event──► Stopped
//!                 │                     │
//!                 └──── Error event ────┴──────────────────► Failed
//! ```

use std::sync::Arc;
use std::time::Duration;

use camkit_common::clock::RecordingClock;
use camkit_common::config::RecordingConfig;
use camkit_common::error::{CamkitError, CamkitResult};
use camkit_device_core::{
    recorder_event_channel, ChunkedRecorder, MediaTrack, RecorderEvent, RecorderEventReceiver,
    RecorderFactory, RecorderOptions, RecorderState, TrackState,
};
use serde::Serialize;
use tokio::sync::mpsc::error::TryRecvError;

use crate::session::{CaptureSession, RecordingSlot, SessionId};

/// Lifecycle of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// The recorder is running and chunks are being buffered.
    Recording,
    /// `stop` has been issued and is waiting for the recorder to finish.
    Stopping,
    /// Finalized into an [`EncodedVideo`]; the buffer is empty.
    Stopped,
    /// The recorder reported an error; buffered chunks are kept.
    Failed,
}

/// A finalized recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedVideo {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub chunk_count: usize,
    pub duration_secs: f64,
    /// Wall-clock start time (RFC 3339).
    pub started_at: String,
}

/// Starts recordings against open capture sessions.
pub struct VideoRecorder {
    factory: Arc<dyn RecorderFactory>,
    config: RecordingConfig,
}

impl VideoRecorder {
    pub fn new(factory: Arc<dyn RecorderFactory>, config: RecordingConfig) -> Self {
        Self { factory, config }
    }

    /// First container/codec from the preference list the factory supports.
    pub fn negotiate_mime_type(&self) -> CamkitResult<String> {
        self.config
            .mime_preferences
            .iter()
            .find(|mime| self.factory.is_type_supported(mime))
            .cloned()
            .ok_or_else(|| {
                CamkitError::unsupported(format!(
                    "recorder supports none of {:?}",
                    self.config.mime_preferences
                ))
            })
    }

    /// Start recording every live track of `session`.
    ///
    /// Returns as soon as the recorder is running.
    pub fn start(&self, session: &CaptureSession) -> CamkitResult<RecordingSession> {
        let slot = session.claim_recording()?;
        let mime_type = self.negotiate_mime_type()?;

        let tracks: Vec<Arc<dyn MediaTrack>> = session
            .tracks()?
            .iter()
            .filter(|t| t.ready_state() == TrackState::Live)
            .cloned()
            .collect();
        if tracks.is_empty() {
            return Err(CamkitError::invalid_argument(format!(
                "capture session {} has no live tracks",
                session.id()
            )));
        }

        let options = RecorderOptions {
            mime_type: mime_type.clone(),
            video_bits_per_second: self.config.video_bits_per_second,
            audio_bits_per_second: self.config.audio_bits_per_second,
        };
        let (events_tx, events) = recorder_event_channel();
        let mut recorder = self
            .factory
            .create(&tracks, &options, events_tx)
            .map_err(|e| e.into_recorder_error())?;

        // A zero timeslice means "no slicing": one chunk at stop.
        let timeslice = self
            .config
            .timeslice_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        recorder.start(timeslice).map_err(|e| e.into_recorder_error())?;

        let recording = RecordingSession {
            id: uuid::Uuid::new_v4(),
            session: session.id(),
            mime_type,
            recorder,
            events,
            chunks: Vec::new(),
            state: RecordingState::Recording,
            recorder_stopped: false,
            failure: None,
            clock: RecordingClock::start(),
            slot: Some(slot),
            capture: session.clone(),
        };

        tracing::info!(
            recording = %recording.id,
            session = %session.id(),
            mime_type = %recording.mime_type,
            tracks = tracks.len(),
            "Recording started"
        );
        Ok(recording)
    }
}

/// One in-flight recording. Finalized exactly once by [`Self::stop`].
pub struct RecordingSession {
    id: uuid::Uuid,
    session: SessionId,
    mime_type: String,
    recorder: Box<dyn ChunkedRecorder>,
    events: RecorderEventReceiver,
    chunks: Vec<Vec<u8>>,
    state: RecordingState,
    /// The recorder emitted Stop on its own (e.g. its tracks ended).
    recorder_stopped: bool,
    failure: Option<String>,
    clock: RecordingClock,
    slot: Option<RecordingSlot>,
    capture: CaptureSession,
}

impl RecordingSession {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// The capture session being recorded.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// The recorder's error message, once failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Chunks received so far, in emission order.
    pub fn buffered_chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Total buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Take the chunks of a failed recording for inspection or retry.
    pub fn take_chunks(&mut self) -> CamkitResult<Vec<Vec<u8>>> {
        if self.state != RecordingState::Failed {
            return Err(CamkitError::invalid_argument(format!(
                "recording {} is {:?}; chunks can only be taken after a failure",
                self.id, self.state
            )));
        }
        Ok(std::mem::take(&mut self.chunks))
    }

    /// Process every event already delivered, without waiting.
    pub fn poll(&mut self) -> RecordingState {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.handle_event(event) {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.state == RecordingState::Recording && !self.recorder_stopped {
                        self.fail("recorder closed its event stream");
                    }
                    break;
                }
            }
        }
        self.state
    }

    /// Stop recording and assemble the buffered chunks into one blob.
    ///
    /// Stopping early is not an error: whatever has been buffered is
    /// finalized. Fails with `InvalidArgument` unless the recording is still
    /// running (including when a previous `stop` was abandoned mid-flight),
    /// and with `Recorder` if the recorder reports an error before stopping.
    pub async fn stop(&mut self) -> CamkitResult<EncodedVideo> {
        self.poll();
        match self.state {
            RecordingState::Recording => {}
            RecordingState::Failed => {
                return Err(CamkitError::recorder(
                    self.failure.clone().unwrap_or_default(),
                ))
            }
            RecordingState::Stopping => {
                return Err(CamkitError::invalid_argument(format!(
                    "recording {} already has a stop outstanding",
                    self.id
                )))
            }
            RecordingState::Stopped => {
                return Err(CamkitError::invalid_argument(format!(
                    "recording {} is already finalized",
                    self.id
                )))
            }
        }

        if let Err(e) = self.capture.ensure_open() {
            if let Err(stop_err) = self.recorder.stop() {
                tracing::debug!(recording = %self.id, error = %stop_err, "Recorder stop after session close failed");
            }
            self.fail("capture session was closed during recording");
            return Err(e);
        }

        self.state = RecordingState::Stopping;
        if self.recorder_stopped {
            return Ok(self.finalize());
        }

        if let Err(e) = self.recorder.stop() {
            let err = e.into_recorder_error();
            self.fail(err.to_string());
            return Err(err);
        }

        while let Some(event) = self.events.recv().await {
            if self.handle_event(event) {
                break;
            }
        }

        match self.state {
            RecordingState::Stopping if self.recorder_stopped => Ok(self.finalize()),
            RecordingState::Failed => Err(CamkitError::recorder(
                self.failure.clone().unwrap_or_default(),
            )),
            _ => {
                self.fail("recorder closed its event stream before stopping");
                Err(CamkitError::recorder(
                    "recorder closed its event stream before stopping",
                ))
            }
        }
    }

    /// Apply one event. Returns true once a terminal event was seen.
    fn handle_event(&mut self, event: RecorderEvent) -> bool {
        match event {
            RecorderEvent::Data(bytes) => {
                if matches!(self.state, RecordingState::Recording | RecordingState::Stopping) {
                    tracing::trace!(recording = %self.id, bytes = bytes.len(), "Chunk buffered");
                    self.chunks.push(bytes);
                } else {
                    tracing::debug!(recording = %self.id, state = ?self.state, "Dropping late chunk");
                }
                false
            }
            RecorderEvent::Stop => {
                if self.state == RecordingState::Recording {
                    tracing::info!(recording = %self.id, "Recorder stopped on its own");
                }
                self.recorder_stopped = true;
                true
            }
            RecorderEvent::Error(message) => {
                self.fail(message);
                true
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(
            recording = %self.id,
            buffered = self.chunks.len(),
            error = %message,
            "Recording failed"
        );
        self.failure = Some(message);
        self.state = RecordingState::Failed;
        self.slot.take();
    }

    fn finalize(&mut self) -> EncodedVideo {
        let chunks = std::mem::take(&mut self.chunks);
        let chunk_count = chunks.len();
        let bytes = chunks.concat();
        self.state = RecordingState::Stopped;
        self.slot.take();

        let duration_secs = self.clock.elapsed_secs();
        tracing::info!(
            recording = %self.id,
            chunks = chunk_count,
            bytes = bytes.len(),
            duration_secs,
            "Recording finalized"
        );

        EncodedVideo {
            bytes,
            mime_type: self.mime_type.clone(),
            chunk_count,
            duration_secs,
            started_at: self.clock.epoch_wall().to_string(),
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if self.recorder.state() == RecorderState::Recording {
            if let Err(e) = self.recorder.stop() {
                tracing::debug!(recording = %self.id, error = %e, "Recorder stop on drop failed");
            }
        }
        if self.state == RecordingState::Recording && !self.recorder_stopped {
            tracing::warn!(
                recording = %self.id,
                buffered = self.chunks.len(),
                "Recording dropped without stop; buffered chunks discarded"
            );
        }
    }
}
