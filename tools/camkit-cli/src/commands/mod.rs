//! Subcommand implementations and the shared synthetic backend.

use std::sync::Arc;

use anyhow::Context;
use camkit_capture_engine::CaptureSessionManager;
use camkit_common::config::AppConfig;
use camkit_constraints::Viewport;
use camkit_device_synthetic::SyntheticDevice;
use serde_json::{Map, Value};

pub mod constraints;
pub mod photo;
pub mod probe;
pub mod record;

/// Viewport and overrides shared by every command that opens a session.
pub struct SessionRequest {
    pub viewport: Viewport,
    pub overrides: Option<Map<String, Value>>,
}

impl SessionRequest {
    pub fn parse(overrides: Option<&str>, width: f64, height: f64) -> anyhow::Result<Self> {
        let overrides = match overrides {
            None => None,
            Some(raw) => match serde_json::from_str::<Value>(raw)
                .context("--override is not valid JSON")?
            {
                Value::Object(map) => Some(map),
                other => anyhow::bail!("--override must be a JSON object, got {other}"),
            },
        };
        Ok(Self {
            viewport: Viewport::new(width, height),
            overrides,
        })
    }
}

/// Session manager over a fresh synthetic device.
pub fn session_manager(config: &AppConfig) -> CaptureSessionManager {
    CaptureSessionManager::new(Arc::new(SyntheticDevice::new()), config.capture.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_must_be_an_object() {
        assert!(SessionRequest::parse(Some("[1]"), 1.0, 1.0).is_err());
        assert!(SessionRequest::parse(Some("{oops"), 1.0, 1.0).is_err());

        let request =
            SessionRequest::parse(Some(r#"{"video":{"facingMode":"user"}}"#), 640.0, 480.0).unwrap();
        assert_eq!(request.overrides.unwrap()["video"]["facingMode"], "user");
        assert_eq!(request.viewport, Viewport::new(640.0, 480.0));
    }
}
