//! Power mode for light control.

use serde::{Deserialize, Serialize};

/// Power state for a light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl PowerMode {
    /// The value of the bridge's `on` field for this mode.
    pub fn is_on(self) -> bool {
        matches!(self, PowerMode::On)
    }
}

impl From<bool> for PowerMode {
    fn from(on: bool) -> Self {
        if on { PowerMode::On } else { PowerMode::Off }
    }
}
