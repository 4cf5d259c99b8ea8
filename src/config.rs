//! Animation effect configuration.
//!
//! The document is a JSON object mapping effect names to four ranges:
//!
//! ```json
//! {
//!   "ember": {
//!     "speed": {"min": 50000, "max": 200000},
//!     "hue":   {"min": 0,     "max": 6000},
//!     "bri":   {"min": 80,    "max": 200},
//!     "sat":   {"min": 200,   "max": 254}
//!   }
//! }
//! ```
//!
//! `speed` is the pause after each light update, in microseconds.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use rand::seq::IteratorRandom;
use serde_json::{Map, Value};
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::errors::ConfigError;
use crate::types::EffectRange;

type Result<T> = std::result::Result<T, ConfigError>;

/// The four ranges every effect defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum EffectKey {
    Speed,
    Hue,
    Bri,
    Sat,
}

/// The two ends of an effect range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

/// One named animation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDefinition {
    /// Pause after each light update, in microseconds
    pub speed: EffectRange,
    pub hue: EffectRange,
    pub bri: EffectRange,
    pub sat: EffectRange,
}

impl AnimationDefinition {
    pub fn range(&self, key: EffectKey) -> EffectRange {
        match key {
            EffectKey::Speed => self.speed,
            EffectKey::Hue => self.hue,
            EffectKey::Bri => self.bri,
            EffectKey::Sat => self.sat,
        }
    }

    fn from_json(effect: &str, value: &Value) -> Result<Self> {
        let Some(fields) = value.as_object() else {
            return Err(ConfigError::InvalidEffect {
                effect: effect.to_string(),
            });
        };

        let range = |key| parse_range(effect, fields, key);
        let definition = AnimationDefinition {
            speed: range(EffectKey::Speed)?,
            hue: range(EffectKey::Hue)?,
            bri: range(EffectKey::Bri)?,
            sat: range(EffectKey::Sat)?,
        };

        // min <= max already holds, so a non-negative min covers both ends.
        if definition.speed.min() < 0 {
            return Err(ConfigError::NegativeSpeed {
                effect: effect.to_string(),
                bound: Bound::Min,
            });
        }

        Ok(definition)
    }
}

fn parse_range(effect: &str, fields: &Map<String, Value>, key: EffectKey) -> Result<EffectRange> {
    let name: &'static str = key.into();
    let Some(range) = fields.get(name) else {
        return Err(ConfigError::MissingKey {
            effect: effect.to_string(),
            key,
        });
    };

    let bound = |bound: Bound| -> Result<i64> {
        let name: &'static str = bound.into();
        let value = range
            .get(name)
            .ok_or_else(|| ConfigError::MissingBound {
                effect: effect.to_string(),
                key,
                bound,
            })?;
        value.as_i64().ok_or_else(|| ConfigError::NonIntegerBound {
            effect: effect.to_string(),
            key,
            bound,
        })
    };

    let (min, max) = (bound(Bound::Min)?, bound(Bound::Max)?);
    EffectRange::new(min, max).ok_or_else(|| ConfigError::InvertedRange {
        effect: effect.to_string(),
        key,
        min,
        max,
    })
}

/// Named effects, validated once and immutable afterwards.
///
/// Effects are ordered by name, so a seeded random source always picks the
/// same sequence of effects for the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationConfig {
    effects: BTreeMap<String, AnimationDefinition>,
}

impl AnimationConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_animator::AnimationConfig;
    ///
    /// let config = AnimationConfig::parse(r#"{
    ///     "calm": {
    ///         "speed": {"min": 1000, "max": 2000},
    ///         "hue": {"min": 40000, "max": 47000},
    ///         "bri": {"min": 50, "max": 120},
    ///         "sat": {"min": 150, "max": 254}
    ///     }
    /// }"#).unwrap();
    /// assert_eq!(config.len(), 1);
    /// assert_eq!(config.get("calm").unwrap().hue.max(), 47000);
    ///
    /// // Bounds must be ordered.
    /// assert!(AnimationConfig::parse(r#"{"bad": {
    ///     "speed": {"min": 0, "max": 0},
    ///     "hue": {"min": 10, "max": 5},
    ///     "bri": {"min": 0, "max": 0},
    ///     "sat": {"min": 0, "max": 0}
    /// }}"#).is_err());
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(document) = value.as_object() else {
            return Err(ConfigError::NotAnObject);
        };
        if document.is_empty() {
            return Err(ConfigError::NoEffects);
        }

        let effects = document
            .iter()
            .map(|(name, effect)| {
                AnimationDefinition::from_json(name, effect).map(|def| (name.clone(), def))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(AnimationConfig { effects })
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn get(&self, name: &str) -> Option<&AnimationDefinition> {
        self.effects.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnimationDefinition)> {
        self.effects.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Pick an effect uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&str, &AnimationDefinition)> {
        self.iter().choose(rng)
    }
}
