//! Hue, brightness and saturation in the bridge's native units.

use serde::Serialize;

use crate::errors::ValidationError;

/// A color state for a single light.
///
/// - Hue: position on the color wheel, 0-65535 (both ends are red)
/// - Brightness: 0-254 (0 is the dimmest level, not off)
/// - Saturation: 0-254 (0 is white, 254 is the most colorful)
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ColorCommand {
    hue: u16,
    #[serde(rename = "bri")]
    brightness: u8,
    #[serde(rename = "sat")]
    saturation: u8,
}

impl ColorCommand {
    pub const HUE_MAX: i64 = 65535;
    pub const BRIGHTNESS_MAX: i64 = 254;
    pub const SATURATION_MAX: i64 = 254;

    /// Create a color, checking hue, then brightness, then saturation.
    ///
    /// The error names the first field that is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_animator::{ColorCommand, ValidationError};
    ///
    /// assert!(ColorCommand::new(0, 254, 254).is_ok());
    /// assert!(ColorCommand::new(65535, 0, 0).is_ok());
    /// assert_eq!(
    ///     ColorCommand::new(65536, 255, 0),
    ///     Err(ValidationError::HueOutOfRange(65536))
    /// );
    /// assert_eq!(
    ///     ColorCommand::new(100, 0, -1),
    ///     Err(ValidationError::SaturationOutOfRange(-1))
    /// );
    /// ```
    pub fn new(hue: i64, brightness: i64, saturation: i64) -> Result<Self, ValidationError> {
        let hue = checked(hue, Self::HUE_MAX).ok_or(ValidationError::HueOutOfRange(hue))?;
        let brightness = checked(brightness, Self::BRIGHTNESS_MAX)
            .ok_or(ValidationError::BrightnessOutOfRange(brightness))?;
        let saturation = checked(saturation, Self::SATURATION_MAX)
            .ok_or(ValidationError::SaturationOutOfRange(saturation))?;

        Ok(ColorCommand {
            hue: hue as u16,
            brightness: brightness as u8,
            saturation: saturation as u8,
        })
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }
}

fn checked(value: i64, max: i64) -> Option<i64> {
    (0..=max).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let color = ColorCommand::new(65535, 254, 254).unwrap();
        assert_eq!(color.hue(), 65535);
        assert_eq!(color.brightness(), 254);
        assert_eq!(color.saturation(), 254);
        assert!(ColorCommand::new(0, 0, 0).is_ok());
    }

    #[test]
    fn test_first_invalid_field_wins() {
        assert_eq!(
            ColorCommand::new(-1, 300, 300),
            Err(ValidationError::HueOutOfRange(-1))
        );
        assert_eq!(
            ColorCommand::new(10, 255, 300),
            Err(ValidationError::BrightnessOutOfRange(255))
        );
        assert_eq!(
            ColorCommand::new(10, 10, 255),
            Err(ValidationError::SaturationOutOfRange(255))
        );
    }

    #[test]
    fn test_serializes_with_bridge_field_names() {
        let color = ColorCommand::new(1000, 20, 30).unwrap();
        assert_eq!(
            serde_json::to_value(color).unwrap(),
            serde_json::json!({"hue": 1000, "bri": 20, "sat": 30})
        );
    }
}
