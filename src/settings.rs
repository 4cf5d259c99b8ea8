//! Process settings read once at startup.

use crate::bridge::BridgeConnection;
use crate::errors::{SettingsError, ValidationError};
use crate::types::LightId;

type Result<T> = std::result::Result<T, SettingsError>;

/// Everything the animator needs from its environment.
///
/// | Variable | Meaning |
/// |---|---|
/// | `DEV` | `1`/`true`/`yes`/`on` selects the local bridge address |
/// | `HUE_BRIDGE_LOCAL_IP` | bridge address used when `DEV` is set |
/// | `HUE_BRIDGE_REMOTE_IP` | bridge address used otherwise |
/// | `HUE_TOKEN` | bridge API token |
/// | `LIGHTS` | comma separated light ids |
/// | `MIN_DURATION`, `MAX_DURATION` | effect length bounds in ticks |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dev: bool,
    pub bridge: BridgeConnection,
    pub lights: Vec<LightId>,
    pub min_duration: u32,
    pub max_duration: u32,
}

impl Settings {
    pub const DEV: &'static str = "DEV";
    pub const LOCAL_IP: &'static str = "HUE_BRIDGE_LOCAL_IP";
    pub const REMOTE_IP: &'static str = "HUE_BRIDGE_REMOTE_IP";
    pub const TOKEN: &'static str = "HUE_TOKEN";
    pub const LIGHTS: &'static str = "LIGHTS";
    pub const MIN_DURATION: &'static str = "MIN_DURATION";
    pub const MAX_DURATION: &'static str = "MAX_DURATION";

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read only the bridge connection from the process environment.
    ///
    /// Needs `DEV`, the matching address variable and `HUE_TOKEN`; the light
    /// list and duration bounds are not consulted.
    pub fn bridge_from_env() -> Result<BridgeConnection> {
        Self::bridge_from_lookup(&|var: &str| std::env::var(var).ok()).map(|(_, bridge)| bridge)
    }

    /// Resolve the bridge connection through `lookup`, returning whether the
    /// local address was selected.
    pub fn bridge_from_lookup<F>(lookup: &F) -> Result<(bool, BridgeConnection)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(SettingsError::Missing(var));

        let dev = lookup(Self::DEV).is_some_and(|value| is_truthy(&value));
        let address_var = if dev { Self::LOCAL_IP } else { Self::REMOTE_IP };
        let address = required(address_var)?;
        let token = required(Self::TOKEN)?;

        let bridge = BridgeConnection::new(&address, &token).map_err(|e| {
            let var = match e {
                ValidationError::EmptyField("token") => Self::TOKEN,
                _ => address_var,
            };
            SettingsError::invalid(var, e)
        })?;
        Ok((dev, bridge))
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use hue_animator::Settings;
    ///
    /// let env = HashMap::from([
    ///     ("HUE_BRIDGE_REMOTE_IP", "10.0.0.2"),
    ///     ("HUE_TOKEN", "s3cr3t"),
    ///     ("LIGHTS", "1, 2,3"),
    ///     ("MIN_DURATION", "5"),
    ///     ("MAX_DURATION", "20"),
    /// ]);
    /// let settings = Settings::from_lookup(|var| env.get(var).map(|v| v.to_string())).unwrap();
    /// assert!(!settings.dev);
    /// assert_eq!(settings.lights.len(), 3);
    /// assert_eq!(settings.bridge.address(), "http://10.0.0.2");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(SettingsError::Missing(var));

        let (dev, bridge) = Self::bridge_from_lookup(&lookup)?;

        let lights = parse_lights(&required(Self::LIGHTS)?)?;
        let min_duration = parse_duration(Self::MIN_DURATION, &required(Self::MIN_DURATION)?)?;
        let max_duration = parse_duration(Self::MAX_DURATION, &required(Self::MAX_DURATION)?)?;
        if min_duration > max_duration {
            return Err(SettingsError::invalid(
                Self::MIN_DURATION,
                format!("{min_duration} is greater than {}", Self::MAX_DURATION),
            ));
        }

        Ok(Settings {
            dev,
            bridge,
            lights,
            min_duration,
            max_duration,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_lights(value: &str) -> Result<Vec<LightId>> {
    let lights: Vec<LightId> = value
        .split(',')
        .map(str::trim)
        .filter_map(|id| LightId::parse(id).ok())
        .collect();

    if lights.is_empty() {
        return Err(SettingsError::invalid(
            Settings::LIGHTS,
            "no light ids given",
        ));
    }
    Ok(lights)
}

fn parse_duration(var: &'static str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| SettingsError::invalid(var, format!("{value:?}: {e}")))
}
