//! Error types shared across camkit crates.

/// Top-level error type for camkit operations.
#[derive(Debug, thiserror::Error)]
pub enum CamkitError {
    /// A handle was passed in the wrong state (closed session, finished
    /// recording, zero-sized feed).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The device layer denied or could not satisfy a capture request.
    #[error("Device access error: {message}")]
    DeviceAccess { message: String },

    #[error("Unsupported capability: {message}")]
    UnsupportedCapability { message: String },

    #[error("Session has no audio track")]
    NoAudioTrack,

    #[error("Encode error: {message}")]
    Encode { message: String },

    /// The underlying recorder reported an error mid-session.
    #[error("Recorder error: {message}")]
    Recorder { message: String },

    #[error("A recording is already in progress for session {session}")]
    RecordingInProgress { session: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CamkitError.
pub type CamkitResult<T> = Result<T, CamkitError>;

impl CamkitError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn device_access(msg: impl Into<String>) -> Self {
        Self::DeviceAccess {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder {
            message: msg.into(),
        }
    }

    pub fn recording_in_progress(session: impl Into<String>) -> Self {
        Self::RecordingInProgress {
            session: session.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = CamkitError::unsupported("torch");
        assert_eq!(err.to_string(), "Unsupported capability: torch");
        assert_eq!(
            CamkitError::NoAudioTrack.to_string(),
            "Session has no audio track"
        );
    }
}
