//! Light descriptors and bridge-reported errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::StateUpdate;
use crate::types::{ColorCommand, PowerMode};

/// One entry of `GET /api/{token}/lights`.
///
/// Bridges and firmware versions differ in what they report, so every field
/// falls back to its default when absent.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct LightDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub light_type: String,
    #[serde(rename = "modelid", default)]
    pub model_id: Option<String>,
    #[serde(rename = "manufacturername", default)]
    pub manufacturer: Option<String>,
    #[serde(rename = "uniqueid", default)]
    pub unique_id: Option<String>,
    #[serde(rename = "swversion", default)]
    pub sw_version: Option<String>,
    #[serde(default)]
    pub state: LightState,
}

/// Current state of a light as reported by the bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct LightState {
    #[serde(default)]
    pub on: bool,
    pub bri: Option<u8>,
    pub hue: Option<u16>,
    pub sat: Option<u8>,
    /// Color temperature in mireds
    pub ct: Option<u16>,
    pub colormode: Option<String>,
    #[serde(default)]
    pub reachable: bool,
}

impl LightState {
    pub fn power(&self) -> PowerMode {
        PowerMode::from(self.on)
    }

    /// The current color when the light reports all three components.
    pub fn color(&self) -> Option<ColorCommand> {
        StateUpdate {
            on: None,
            hue: self.hue,
            bri: self.bri,
            sat: self.sat,
        }
        .get_color()
    }
}

/// An error entry from a bridge response body.
///
/// The bridge answers `PUT` requests with status 200 even when a command is
/// rejected, listing the failures as `[{"error": {...}}]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeApiError {
    #[serde(rename = "type")]
    pub kind: u32,
    pub address: String,
    pub description: String,
}

/// Extract the error entries from a decoded bridge response.
///
/// # Examples
///
/// ```
/// use hue_animator::bridge_errors;
/// use serde_json::json;
///
/// let body = json!([
///     {"success": {"/lights/1/state/on": true}},
///     {"error": {"type": 201, "address": "/lights/1/state/hue", "description": "device is off"}}
/// ]);
/// let errors = bridge_errors(&body);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].kind, 201);
/// ```
pub fn bridge_errors(body: &Value) -> Vec<BridgeApiError> {
    let Some(entries) = body.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("error"))
        .filter_map(|err| serde_json::from_value(err.clone()).ok())
        .collect()
}
