//! Bridge light identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Identifier of a light on the bridge, e.g. `"3"`.
///
/// The bridge treats these as opaque strings; the only rule is that they are
/// never empty.
///
/// # Examples
///
/// ```
/// use hue_animator::LightId;
///
/// assert_eq!(LightId::parse("3").unwrap().as_str(), "3");
/// assert!(LightId::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LightId(String);

impl LightId {
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        Self::try_from(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LightId {
    type Error = ValidationError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        if id.is_empty() {
            Err(ValidationError::EmptyLightId)
        } else {
            Ok(LightId(id))
        }
    }
}

impl From<LightId> for String {
    fn from(id: LightId) -> Self {
        id.0
    }
}

impl AsRef<str> for LightId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
