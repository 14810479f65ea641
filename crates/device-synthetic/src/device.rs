//! Scriptable device access and tracks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use camkit_constraints::ConstraintsSpec;
use camkit_device_core::{
    DeviceAccess, DeviceError, MediaStream, MediaTrack, TrackKind, TrackState,
};
use serde_json::{json, Value};

use crate::lock;

/// Shape of one synthetic track.
#[derive(Debug, Clone)]
pub struct TrackProfile {
    pub label: String,
    pub capabilities: Value,
    /// Reject every `apply_constraints` call.
    pub reject_constraints: bool,
}

impl TrackProfile {
    /// Rear camera with a torch and fill-light modes.
    pub fn rear_camera() -> Self {
        Self {
            label: "Synthetic rear camera".to_string(),
            capabilities: json!({
                "torch": true,
                "fillLightMode": ["auto", "off", "flash"],
                "facingMode": ["environment"],
                "width": { "min": 1, "max": 1920 },
                "height": { "min": 1, "max": 1080 },
            }),
            reject_constraints: false,
        }
    }

    /// Camera advertising no light controls.
    pub fn plain_camera() -> Self {
        Self {
            label: "Synthetic camera".to_string(),
            capabilities: json!({ "facingMode": ["user"] }),
            reject_constraints: false,
        }
    }

    pub fn microphone() -> Self {
        Self {
            label: "Synthetic microphone".to_string(),
            capabilities: json!({ "echoCancellation": [true, false] }),
            reject_constraints: false,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Value) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn rejecting_constraints(mut self) -> Self {
        self.reject_constraints = true;
        self
    }
}

/// In-memory track.
#[derive(Debug)]
pub struct SyntheticTrack {
    id: String,
    kind: TrackKind,
    label: String,
    ended: AtomicBool,
    enabled: AtomicBool,
    capabilities: Mutex<Value>,
    reject_constraints: AtomicBool,
    applied: Mutex<Vec<Value>>,
}

impl SyntheticTrack {
    pub fn new(kind: TrackKind, profile: &TrackProfile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label: profile.label.clone(),
            ended: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
            capabilities: Mutex::new(profile.capabilities.clone()),
            reject_constraints: AtomicBool::new(profile.reject_constraints),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the device swapping underneath the track.
    pub fn set_capabilities(&self, capabilities: Value) {
        *lock(&self.capabilities) = capabilities;
    }

    pub fn set_reject_constraints(&self, reject: bool) {
        self.reject_constraints.store(reject, Ordering::SeqCst);
    }

    /// Constraints accepted so far, oldest first.
    pub fn applied_constraints(&self) -> Vec<Value> {
        lock(&self.applied).clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaTrack for SyntheticTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn stop(&self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            tracing::debug!(track = %self.id, kind = %self.kind, "Synthetic track stopped");
        }
    }

    fn ready_state(&self) -> TrackState {
        if self.ended.load(Ordering::SeqCst) {
            TrackState::Ended
        } else {
            TrackState::Live
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn capabilities(&self) -> Value {
        lock(&self.capabilities).clone()
    }

    async fn apply_constraints(&self, constraints: Value) -> Result<(), DeviceError> {
        if self.is_stopped() {
            return Err(DeviceError::Rejected(format!("track {} has ended", self.id)));
        }
        if self.reject_constraints.load(Ordering::SeqCst) {
            return Err(DeviceError::Rejected(format!(
                "{} refused constraints {constraints}",
                self.label
            )));
        }
        lock(&self.applied).push(constraints);
        Ok(())
    }
}

/// Device access backed by fixed track profiles.
#[derive(Debug)]
pub struct SyntheticDevice {
    video: Option<TrackProfile>,
    audio: Option<TrackProfile>,
    deny: Option<DeviceError>,
    issued: Mutex<Vec<Arc<SyntheticTrack>>>,
    requests: Mutex<Vec<ConstraintsSpec>>,
}

impl Default for SyntheticDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticDevice {
    /// A rear camera with torch support and a microphone.
    pub fn new() -> Self {
        Self {
            video: Some(TrackProfile::rear_camera()),
            audio: Some(TrackProfile::microphone()),
            deny: None,
            issued: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_video(mut self, profile: TrackProfile) -> Self {
        self.video = Some(profile);
        self
    }

    pub fn with_audio(mut self, profile: TrackProfile) -> Self {
        self.audio = Some(profile);
        self
    }

    pub fn without_video(mut self) -> Self {
        self.video = None;
        self
    }

    pub fn without_audio(mut self) -> Self {
        self.audio = None;
        self
    }

    /// Fail every request with `error`.
    pub fn denying(mut self, error: DeviceError) -> Self {
        self.deny = Some(error);
        self
    }

    /// Every track handed out so far.
    pub fn issued_tracks(&self) -> Vec<Arc<SyntheticTrack>> {
        lock(&self.issued).clone()
    }

    pub fn last_request(&self) -> Option<ConstraintsSpec> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait::async_trait]
impl DeviceAccess for SyntheticDevice {
    async fn request_capture(
        &self,
        constraints: &ConstraintsSpec,
    ) -> Result<MediaStream, DeviceError> {
        lock(&self.requests).push(constraints.clone());

        if let Some(err) = &self.deny {
            return Err(err.clone());
        }

        let wants_video = constraints.wants_video();
        let wants_audio = constraints.wants_audio();
        if !wants_video && !wants_audio {
            return Err(DeviceError::Other(
                "at least one of audio or video must be requested".to_string(),
            ));
        }

        let mut tracks: Vec<Arc<SyntheticTrack>> = Vec::new();
        if wants_video {
            let profile = self
                .video
                .as_ref()
                .ok_or_else(|| DeviceError::NotFound("no camera attached".to_string()))?;
            tracks.push(Arc::new(SyntheticTrack::new(TrackKind::Video, profile)));
        }
        if wants_audio {
            let profile = self
                .audio
                .as_ref()
                .ok_or_else(|| DeviceError::NotFound("no microphone attached".to_string()))?;
            tracks.push(Arc::new(SyntheticTrack::new(TrackKind::Audio, profile)));
        }

        lock(&self.issued).extend(tracks.iter().cloned());
        tracing::debug!(tracks = tracks.len(), "Synthetic capture granted");

        Ok(MediaStream::new(
            tracks
                .into_iter()
                .map(|t| t as Arc<dyn MediaTrack>)
                .collect(),
        ))
    }
}
