//! Capability-gated hardware controls: torch/flash and microphone mute.
//!
//! Light control sets an explicit state rather than toggling. Capability
//! sets are read fresh on every call because they change when the device
//! behind a track changes.

use camkit_common::error::{CamkitError, CamkitResult};
use camkit_device_core::{FillLightMode, MediaTrack, TrackCapabilities};
use serde::Serialize;
use serde_json::{json, Value};

use crate::session::CaptureSession;

/// Which light controls the session's camera currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LightCapability {
    pub torch: bool,
    pub fill_light: bool,
}

impl LightCapability {
    pub fn is_available(&self) -> bool {
        self.torch || self.fill_light
    }
}

/// Probe the light controls of the session's video track.
///
/// A session without a video track reports no capability.
pub fn light_capability(session: &CaptureSession) -> CamkitResult<LightCapability> {
    let Some(track) = session.video_track()? else {
        return Ok(LightCapability::default());
    };
    let caps = TrackCapabilities::from_raw(&track.capabilities());
    Ok(LightCapability {
        torch: caps.has_torch(),
        fill_light: caps.has_fill_light(),
    })
}

/// Build the single constraint object that switches the light.
///
/// An advanced `torch` constraint takes precedence over `fillLightMode`.
/// Returns `None` when neither can express the requested state.
pub fn light_constraint(caps: &TrackCapabilities, on: bool) -> Option<Value> {
    let wanted = if on {
        FillLightMode::Flash
    } else {
        FillLightMode::Off
    };
    let fill_light = caps
        .fill_light_modes
        .contains(&wanted)
        .then(|| json!({ "fillLightMode": wanted.as_str() }));
    let torch = caps
        .has_torch()
        .then(|| json!({ "advanced": [{ "torch": on }] }));

    torch.or(fill_light)
}

/// Switch the camera light on or off.
///
/// Fails with `UnsupportedCapability` if the camera offers neither torch nor
/// a usable fill-light mode. If the device rejects the constraint the
/// failure is logged and the requested state is still returned.
pub async fn set_light(session: &CaptureSession, on: bool) -> CamkitResult<bool> {
    let track = session
        .video_track()?
        .ok_or_else(|| CamkitError::unsupported("session has no video track"))?
        .clone();

    let caps = TrackCapabilities::from_raw(&track.capabilities());
    let constraint = light_constraint(&caps, on).ok_or_else(|| {
        CamkitError::unsupported(format!(
            "track {} offers neither torch nor fillLightMode",
            track.label()
        ))
    })?;

    tracing::debug!(session = %session.id(), track = %track.id(), %constraint, "Applying light constraint");
    if let Err(e) = track.apply_constraints(constraint).await {
        tracing::warn!(
            session = %session.id(),
            track = %track.id(),
            error = %e,
            on,
            "Light constraint was not applied"
        );
    }
    Ok(on)
}

/// Mute or unmute every audio track. Returns the resulting mute state.
pub fn set_mute(session: &CaptureSession, muted: bool) -> CamkitResult<bool> {
    let tracks = session.audio_tracks()?;
    if tracks.is_empty() {
        return Err(CamkitError::NoAudioTrack);
    }
    for track in &tracks {
        track.set_enabled(!muted);
    }
    tracing::debug!(session = %session.id(), muted, tracks = tracks.len(), "Audio mute updated");
    Ok(muted)
}

/// Whether every audio track is disabled.
pub fn is_muted(session: &CaptureSession) -> CamkitResult<bool> {
    let tracks = session.audio_tracks()?;
    if tracks.is_empty() {
        return Err(CamkitError::NoAudioTrack);
    }
    Ok(tracks.iter().all(|t| !t.is_enabled()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torch_wins_when_both_are_offered() {
        let caps = TrackCapabilities::from_raw(&json!({
            "torch": true,
            "fillLightMode": ["off", "flash"]
        }));
        assert_eq!(
            light_constraint(&caps, true),
            Some(json!({ "advanced": [{ "torch": true }] }))
        );
        assert_eq!(
            light_constraint(&caps, false),
            Some(json!({ "advanced": [{ "torch": false }] }))
        );
    }

    #[test]
    fn fill_light_used_without_torch() {
        let caps = TrackCapabilities::from_raw(&json!({ "fillLightMode": ["auto", "off", "flash"] }));
        assert_eq!(
            light_constraint(&caps, true),
            Some(json!({ "fillLightMode": "flash" }))
        );
        assert_eq!(
            light_constraint(&caps, false),
            Some(json!({ "fillLightMode": "off" }))
        );
    }

    #[test]
    fn fill_light_without_flash_cannot_turn_on() {
        let caps = TrackCapabilities::from_raw(&json!({ "fillLightMode": ["off"] }));
        assert_eq!(light_constraint(&caps, true), None);
        assert!(light_constraint(&caps, false).is_some());
    }

    #[test]
    fn nothing_offered_builds_nothing() {
        let caps = TrackCapabilities::from_raw(&json!({ "zoom": { "max": 4 } }));
        assert_eq!(light_constraint(&caps, true), None);
    }
}
