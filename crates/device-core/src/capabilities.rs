//! Typed view over a track's capability set.
//!
//! Capability sets come from the device layer as untyped JSON and vary by
//! platform. This is the only place that inspects their shape; everything
//! downstream works with [`TrackCapabilities`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values accepted by the `fillLightMode` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillLightMode {
    Auto,
    Off,
    Flash,
}

impl FillLightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillLightMode::Auto => "auto",
            FillLightMode::Off => "off",
            FillLightMode::Flash => "flash",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(FillLightMode::Auto),
            "off" => Some(FillLightMode::Off),
            "flash" => Some(FillLightMode::Flash),
            _ => None,
        }
    }
}

/// Hardware features a track currently reports as controllable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCapabilities {
    /// Continuous torch (flashlight) control.
    pub torch: bool,

    /// Fill-light modes, empty when the capability is absent.
    pub fill_light_modes: Vec<FillLightMode>,

    /// The set as reported, for diagnostics.
    pub raw: Value,
}

impl TrackCapabilities {
    /// Validate a raw capability set.
    ///
    /// `torch` may be reported as a boolean or as a list of supported
    /// booleans. `fillLightMode` may be a list of mode names or a single
    /// name. Unrecognized shapes count as absent.
    pub fn from_raw(raw: &Value) -> Self {
        let torch = match raw.get("torch") {
            None => false,
            Some(Value::Bool(supported)) => *supported,
            Some(Value::Array(values)) => values.iter().any(|v| v.as_bool() == Some(true)),
            Some(other) => {
                tracing::debug!(value = %other, "Ignoring malformed torch capability");
                false
            }
        };

        let fill_light_modes = match raw.get("fillLightMode") {
            None => Vec::new(),
            Some(single @ Value::String(_)) => parse_modes(std::slice::from_ref(single)),
            Some(Value::Array(modes)) => parse_modes(modes),
            Some(other) => {
                tracing::debug!(value = %other, "Ignoring malformed fillLightMode capability");
                Vec::new()
            }
        };

        Self {
            torch,
            fill_light_modes,
            raw: raw.clone(),
        }
    }

    pub fn has_torch(&self) -> bool {
        self.torch
    }

    pub fn has_fill_light(&self) -> bool {
        !self.fill_light_modes.is_empty()
    }
}

fn parse_modes(values: &[Value]) -> Vec<FillLightMode> {
    let mut modes = Vec::new();
    for value in values {
        match value.as_str().and_then(FillLightMode::parse) {
            Some(mode) if !modes.contains(&mode) => modes.push(mode),
            Some(_) => {}
            None => tracing::debug!(%value, "Ignoring unknown fill light mode"),
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_browser_style_capabilities() {
        let caps = TrackCapabilities::from_raw(&json!({
            "torch": true,
            "fillLightMode": ["auto", "off", "flash"],
            "zoom": { "min": 1, "max": 8 }
        }));
        assert!(caps.has_torch());
        assert_eq!(
            caps.fill_light_modes,
            vec![FillLightMode::Auto, FillLightMode::Off, FillLightMode::Flash]
        );
    }

    #[test]
    fn torch_as_list_of_supported_values() {
        assert!(TrackCapabilities::from_raw(&json!({ "torch": [false, true] })).has_torch());
        assert!(!TrackCapabilities::from_raw(&json!({ "torch": [false] })).has_torch());
        assert!(!TrackCapabilities::from_raw(&json!({ "torch": false })).has_torch());
    }

    #[test]
    fn single_fill_light_string_is_accepted() {
        let caps = TrackCapabilities::from_raw(&json!({ "fillLightMode": "flash" }));
        assert!(caps.has_fill_light());
        assert!(!caps.has_torch());
    }

    #[test]
    fn malformed_or_missing_entries_count_as_absent() {
        let caps = TrackCapabilities::from_raw(&json!({ "torch": "yes", "fillLightMode": 3 }));
        assert!(!caps.has_torch());
        assert!(!caps.has_fill_light());

        let caps = TrackCapabilities::from_raw(&json!({ "fillLightMode": ["strobe"] }));
        assert!(!caps.has_fill_light());

        let caps = TrackCapabilities::from_raw(&Value::Null);
        assert_eq!(caps.fill_light_modes, Vec::new());
    }
}
