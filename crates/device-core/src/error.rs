//! Errors reported by device-layer implementations.

use camkit_common::error::CamkitError;

/// Failure reported by a device-layer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no matching device: {0}")]
    NotFound(String),

    #[error("device busy: {0}")]
    Busy(String),

    #[error("constraint cannot be satisfied: {constraint}")]
    Overconstrained { constraint: String },

    /// The device refused a command (e.g. an `apply_constraints` call).
    #[error("rejected by device: {0}")]
    Rejected(String),

    #[error("{0}")]
    Other(String),
}

impl DeviceError {
    /// Map a failure on the capture request path.
    pub fn into_access_error(self) -> CamkitError {
        CamkitError::device_access(self.to_string())
    }

    /// Map a failure on the recording path.
    pub fn into_recorder_error(self) -> CamkitError {
        CamkitError::recorder(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_into_the_matching_taxonomy() {
        let err = DeviceError::PermissionDenied("camera".into()).into_access_error();
        assert!(matches!(err, CamkitError::DeviceAccess { ref message } if message.contains("camera")));

        let err = DeviceError::Other("mux failed".into()).into_recorder_error();
        assert!(matches!(err, CamkitError::Recorder { .. }));
    }
}
