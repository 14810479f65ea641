//! Capture session management.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use camkit_common::config::CaptureDefaults;
use camkit_common::error::{CamkitError, CamkitResult};
use camkit_constraints::{ConstraintsSpec, Viewport};
use camkit_device_core::{DeviceAccess, MediaTrack, TrackKind, TrackState};
use serde_json::{Map, Value};

/// Identifier of one open capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct SessionInner {
    id: SessionId,
    constraints: ConstraintsSpec,
    tracks: Vec<Arc<dyn MediaTrack>>,
    opened_at: String,
    closed: AtomicBool,
    recording_active: AtomicBool,
}

/// Handle to an open camera/microphone capture.
///
/// Clones share state: once the session is closed through its manager,
/// every clone reports closed and every operation on it fails.
#[derive(Clone)]
pub struct CaptureSession {
    inner: Arc<SessionInner>,
}

impl CaptureSession {
    fn new(constraints: ConstraintsSpec, tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId(uuid::Uuid::new_v4()),
                constraints,
                tracks,
                opened_at: chrono::Utc::now().to_rfc3339(),
                closed: AtomicBool::new(false),
                recording_active: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// The merged constraints the session was opened with.
    pub fn constraints(&self) -> &ConstraintsSpec {
        &self.inner.constraints
    }

    /// Wall-clock open time (RFC 3339).
    pub fn opened_at(&self) -> &str {
        &self.inner.opened_at
    }

    /// Fail with `InvalidArgument` if the session has been closed.
    pub fn ensure_open(&self) -> CamkitResult<()> {
        if self.is_closed() {
            return Err(CamkitError::invalid_argument(format!(
                "capture session {} is closed",
                self.inner.id
            )));
        }
        Ok(())
    }

    /// Every track owned by the session.
    pub fn tracks(&self) -> CamkitResult<&[Arc<dyn MediaTrack>]> {
        self.ensure_open()?;
        Ok(&self.inner.tracks)
    }

    /// The first video track, if the session has one.
    pub fn video_track(&self) -> CamkitResult<Option<&Arc<dyn MediaTrack>>> {
        Ok(self.tracks()?.iter().find(|t| t.kind() == TrackKind::Video))
    }

    pub fn audio_tracks(&self) -> CamkitResult<Vec<&Arc<dyn MediaTrack>>> {
        Ok(self
            .tracks()?
            .iter()
            .filter(|t| t.kind() == TrackKind::Audio)
            .collect())
    }

    pub fn has_active_recording(&self) -> bool {
        self.inner.recording_active.load(Ordering::SeqCst)
    }

    /// Reserve the session's single recording slot.
    pub(crate) fn claim_recording(&self) -> CamkitResult<RecordingSlot> {
        self.ensure_open()?;
        if self
            .inner
            .recording_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CamkitError::recording_in_progress(self.inner.id.to_string()));
        }
        Ok(RecordingSlot {
            session: self.inner.clone(),
        })
    }

    fn stop_tracks(&self) -> usize {
        let mut stopped = 0;
        for track in &self.inner.tracks {
            if track.ready_state() == TrackState::Live {
                track.stop();
                stopped += 1;
            }
        }
        stopped
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("id", &self.inner.id)
            .field("tracks", &self.inner.tracks.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Exclusive claim on a session's recording slot, released on drop.
pub(crate) struct RecordingSlot {
    session: Arc<SessionInner>,
}

impl Drop for RecordingSlot {
    fn drop(&mut self) {
        self.session.recording_active.store(false, Ordering::SeqCst);
    }
}

/// Opens and closes capture sessions against a device layer.
pub struct CaptureSessionManager {
    access: Arc<dyn DeviceAccess>,
    defaults: CaptureDefaults,
    open: Mutex<HashMap<SessionId, CaptureSession>>,
}

impl CaptureSessionManager {
    pub fn new(access: Arc<dyn DeviceAccess>, defaults: CaptureDefaults) -> Self {
        Self {
            access,
            defaults,
            open: Mutex::new(HashMap::new()),
        }
    }

    /// The constraint tree `open` would request for these inputs.
    pub fn constraints_for(
        &self,
        overrides: Option<&Map<String, Value>>,
        viewport: Viewport,
    ) -> ConstraintsSpec {
        ConstraintsSpec::defaults(&self.defaults, viewport).merged(overrides)
    }

    /// Open a capture session.
    ///
    /// `overrides` are merged over the defaults (rear camera, microphone on,
    /// ideal aspect ratio of `viewport`).
    pub async fn open(
        &self,
        overrides: Option<&Map<String, Value>>,
        viewport: Viewport,
    ) -> CamkitResult<CaptureSession> {
        let constraints = self.constraints_for(overrides, viewport);
        tracing::debug!(constraints = %constraints.to_value(), "Requesting capture");

        let stream = self
            .access
            .request_capture(&constraints)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Capture request failed");
                e.into_access_error()
            })?;

        if stream.tracks().is_empty() {
            return Err(CamkitError::device_access(
                "device layer granted a stream without tracks",
            ));
        }

        let video = stream.video_tracks().count();
        let audio = stream.audio_tracks().count();
        if video > 1 || audio > 1 {
            tracing::warn!(video, audio, "Device returned more tracks than requested");
        }

        let session = CaptureSession::new(constraints, stream.into_tracks());
        self.registry().insert(session.id(), session.clone());

        tracing::info!(session = %session.id(), video, audio, "Capture session opened");
        Ok(session)
    }

    /// Stop every track of `session` and mark it closed.
    pub fn close(&self, session: &CaptureSession) -> CamkitResult<()> {
        let registered = self.registry().remove(&session.id());
        let Some(registered) = registered else {
            return Err(CamkitError::invalid_argument(format!(
                "capture session {} is not open in this manager",
                session.id()
            )));
        };

        registered.inner.closed.store(true, Ordering::SeqCst);
        let stopped = registered.stop_tracks();
        tracing::info!(session = %registered.id(), stopped, "Capture session closed");
        Ok(())
    }

    pub fn is_open(&self, session: &CaptureSession) -> bool {
        self.registry().contains_key(&session.id())
    }

    pub fn open_sessions(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, CaptureSession>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CaptureSessionManager {
    fn drop(&mut self) {
        let sessions: Vec<CaptureSession> = self.registry().drain().map(|(_, s)| s).collect();
        for session in sessions {
            session.inner.closed.store(true, Ordering::SeqCst);
            let stopped = session.stop_tracks();
            tracing::debug!(session = %session.id(), stopped, "Released session on manager drop");
        }
    }
}
