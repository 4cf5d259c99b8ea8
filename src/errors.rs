use std::path::PathBuf;

use crate::config::{Bound, EffectKey};

/// All error types that can occur while driving a bridge or an animation.
///
/// Construction failures ([`Error::Config`], [`Error::Connection`],
/// [`Error::Settings`]) are fatal: the value being built is never handed out.
/// [`Error::Validation`] and [`Error::Transport`] are per call and recoverable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The animation document or engine parameters were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An argument was rejected before reaching the bridge.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The bridge could not be validated at construction.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A request to the bridge failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The process environment was incomplete or invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl Error {
    /// Whether this error can only come out of construction and should abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Connection(_) | Error::Settings(_)
        )
    }
}

/// Input rejected before any request reaches the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A light id was empty or blank.
    #[error("light id must not be empty")]
    EmptyLightId,

    /// Hue outside 0-65535.
    #[error("hue {0} is outside 0..=65535")]
    HueOutOfRange(i64),

    /// Brightness outside 0-254.
    #[error("brightness {0} is outside 0..=254")]
    BrightnessOutOfRange(i64),

    /// Saturation outside 0-254.
    #[error("saturation {0} is outside 0..=254")]
    SaturationOutOfRange(i64),

    /// A state update with every field unset.
    #[error("state update sets no attributes")]
    EmptyUpdate,

    /// A bridge address or token was empty.
    #[error("bridge {0} must not be empty")]
    EmptyField(&'static str),
}

/// The bridge could not be validated at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The validation request failed or returned no JSON.
    #[error("bridge at {address} is unreachable: {source}")]
    Unreachable {
        address: String,
        source: TransportError,
    },

    /// The bridge answered but its config payload carries no `name`.
    #[error("bridge at {address} did not identify itself")]
    NotIdentified { address: String },
}

/// Failures of the HTTP capability underneath the client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, timeout...).
    #[error("{method} {url} failed: {message}")]
    Request {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The bridge answered with status 400 or above.
    #[error("{method} {url} returned status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// The response body was not valid JSON of the expected shape.
    #[error("{method} {url} returned an undecodable body: {source}")]
    Decode {
        method: &'static str,
        url: String,
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("{method} {url} request body could not be encoded: {source}")]
    Encode {
        method: &'static str,
        url: String,
        source: serde_json::Error,
    },

    /// The HTTP client itself could not be built.
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl TransportError {
    pub fn request(method: &'static str, url: &str, message: impl ToString) -> Self {
        TransportError::Request {
            method,
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn status(method: &'static str, url: &str, status: u16) -> Self {
        TransportError::Status {
            method,
            url: url.to_string(),
            status,
        }
    }

    pub fn decode(method: &'static str, url: &str, source: serde_json::Error) -> Self {
        TransportError::Decode {
            method,
            url: url.to_string(),
            source,
        }
    }

    pub fn encode(method: &'static str, url: &str, source: serde_json::Error) -> Self {
        TransportError::Encode {
            method,
            url: url.to_string(),
            source,
        }
    }
}

/// Problems with the animation document or the engine parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The animation file could not be read.
    #[error("failed to read animation file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The animation file is not valid JSON.
    #[error("failed to parse animation json: {0}")]
    Parse(serde_json::Error),

    /// The top level of the document is not an object.
    #[error("animation document must be a json object")]
    NotAnObject,

    /// An effect entry is not an object.
    #[error("effect {effect:?} must be a json object")]
    InvalidEffect { effect: String },

    /// An effect lacks one of `speed`, `hue`, `bri` or `sat`.
    #[error("effect {effect:?} is missing key {key}")]
    MissingKey { effect: String, key: EffectKey },

    /// A range lacks its `min` or `max`.
    #[error("effect {effect:?} key {key} is missing {bound}")]
    MissingBound {
        effect: String,
        key: EffectKey,
        bound: Bound,
    },

    /// A bound is not an integer.
    #[error("effect {effect:?} key {key} {bound} must be an integer")]
    NonIntegerBound {
        effect: String,
        key: EffectKey,
        bound: Bound,
    },

    /// A range has `min > max`.
    #[error("effect {effect:?} key {key} has min {min} greater than max {max}")]
    InvertedRange {
        effect: String,
        key: EffectKey,
        min: i64,
        max: i64,
    },

    /// A speed bound is below zero.
    #[error("effect {effect:?} speed {bound} must not be negative")]
    NegativeSpeed { effect: String, bound: Bound },

    /// The document is an empty object.
    #[error("animation document defines no effects")]
    NoEffects,

    /// The engine was given an empty light list.
    #[error("no lights to animate")]
    NoLights,

    /// The engine was given `min_duration > max_duration`.
    #[error("min duration {min} is greater than max duration {max}")]
    InvertedDurations { min: u32, max: u32 },
}

/// Process settings could not be assembled from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required variable is unset.
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl SettingsError {
    pub fn invalid(var: &'static str, reason: impl ToString) -> Self {
        SettingsError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(Error::from(ConfigError::NoEffects).is_fatal());
        assert!(
            Error::from(ConnectionError::NotIdentified {
                address: "http://10.0.0.2".into()
            })
            .is_fatal()
        );
        assert!(!Error::from(ValidationError::EmptyLightId).is_fatal());
        assert!(!Error::from(TransportError::status("PUT", "http://x", 503)).is_fatal());

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(TransportError::encode("PUT", "http://x", source));
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("PUT http://x request body could not be encoded"));
    }

    #[test]
    fn test_messages_name_effect_key_and_bound() {
        let err = ConfigError::NonIntegerBound {
            effect: "sunset".into(),
            key: EffectKey::Bri,
            bound: Bound::Max,
        };
        assert_eq!(
            err.to_string(),
            "effect \"sunset\" key bri max must be an integer"
        );
    }
}
