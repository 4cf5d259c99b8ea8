//! State payloads for `PUT /lights/{id}/state`.

use serde::{Deserialize, Serialize};

use crate::types::{ColorCommand, PowerMode};

/// A state change to send to a single light.
///
/// Only the fields that were set are serialized, so a payload built from a
/// [`PowerMode`] carries just `on` and one built from a [`ColorCommand`]
/// carries just `hue`, `bri` and `sat`.
///
/// # Creating Payloads
///
/// 1. **From a single attribute** using the [`From`] trait:
///    ```
///    use hue_animator::{PowerMode, StateUpdate};
///    let update = StateUpdate::from(PowerMode::On);
///    assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"on":true}"#);
///    ```
///
/// 2. **Builder pattern** for combining attributes:
///    ```
///    use hue_animator::{ColorCommand, PowerMode, StateUpdate};
///    let mut update = StateUpdate::new();
///    update.power(PowerMode::On);
///    update.color(&ColorCommand::new(46920, 254, 254).unwrap());
///    assert!(update.is_valid());
///    ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub(crate) on: Option<bool>,
    pub(crate) hue: Option<u16>,
    pub(crate) bri: Option<u8>,
    pub(crate) sat: Option<u8>,
}

impl StateUpdate {
    /// Create an empty update. At least one attribute must be set before sending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this update carries at least one attribute.
    ///
    /// ```
    /// use hue_animator::StateUpdate;
    /// assert!(!StateUpdate::new().is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        self.on.is_some() || self.hue.is_some() || self.bri.is_some() || self.sat.is_some()
    }

    pub fn power(&mut self, power: PowerMode) -> &mut Self {
        self.on = Some(power.is_on());
        self
    }

    pub fn color(&mut self, color: &ColorCommand) -> &mut Self {
        self.hue = Some(color.hue());
        self.bri = Some(color.brightness());
        self.sat = Some(color.saturation());
        self
    }

    pub fn get_power(&self) -> Option<PowerMode> {
        self.on.map(PowerMode::from)
    }

    /// Returns the color when hue, brightness and saturation are all set.
    pub fn get_color(&self) -> Option<ColorCommand> {
        match (self.hue, self.bri, self.sat) {
            (Some(hue), Some(bri), Some(sat)) => {
                ColorCommand::new(hue.into(), bri.into(), sat.into()).ok()
            }
            _ => None,
        }
    }
}

impl From<PowerMode> for StateUpdate {
    fn from(power: PowerMode) -> Self {
        let mut update = StateUpdate::new();
        update.power(power);
        update
    }
}

impl From<&ColorCommand> for StateUpdate {
    fn from(color: &ColorCommand) -> Self {
        let mut update = StateUpdate::new();
        update.color(color);
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_power_body() {
        let off = serde_json::to_value(StateUpdate::from(PowerMode::Off)).unwrap();
        assert_eq!(off, json!({"on": false}));
    }

    #[test]
    fn test_color_body_omits_power() {
        let color = ColorCommand::new(12000, 100, 200).unwrap();
        let body = serde_json::to_value(StateUpdate::from(&color)).unwrap();
        assert_eq!(body, json!({"hue": 12000, "bri": 100, "sat": 200}));
    }

    #[test]
    fn test_partial_color_is_not_a_color() {
        let update = StateUpdate {
            hue: Some(1),
            bri: Some(2),
            ..StateUpdate::default()
        };
        assert!(update.is_valid());
        assert!(update.get_color().is_none());
        assert!(update.get_power().is_none());
    }
}
