//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default capture request settings.
    pub capture: CaptureDefaults,

    /// Still photo encoding.
    pub photo: PhotoConfig,

    /// Video recording settings.
    pub recording: RecordingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults used to build the base constraint tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Request a microphone track.
    pub audio: bool,

    /// Camera facing mode ("environment" = rear, "user" = front).
    pub facing_mode: String,

    /// Aspect ratio used when the caller's viewport has a zero dimension.
    pub fallback_aspect_ratio: f64,
}

/// Still photo encoding parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Output MIME type.
    pub mime_type: String,

    /// Encoder quality in `[0.0, 1.0]`; 1.0 requests lossless output.
    pub quality: f32,
}

/// Video recording parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Container/codec candidates in preference order.
    pub mime_preferences: Vec<String>,

    /// How often the recorder should emit a chunk, if at all before stop.
    pub timeslice_ms: Option<u64>,

    pub video_bits_per_second: Option<u32>,

    pub audio_bits_per_second: Option<u32>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camkit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            audio: true,
            facing_mode: "environment".to_string(),
            fallback_aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            mime_type: "image/webp".to_string(),
            quality: 1.0,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_preferences: vec![
                "video/webm;codecs=vp9,opus".to_string(),
                "video/webm;codecs=vp8,opus".to_string(),
                "video/webm".to_string(),
                "video/mp4".to_string(),
            ],
            timeslice_ms: Some(1000),
            video_bits_per_second: None,
            audio_bits_per_second: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("camkit").join("config.json")
}
