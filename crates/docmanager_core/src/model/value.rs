//! Scalar property values.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Acting principal id recorded by blame metadata.
pub type UserId = i64;

/// One scalar value stored on a node property, a document field or an option.
///
/// Absence is modeled with `Option<PropertyValue>`, never with a null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Stable type tag used by persistent stores.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyValue;

    #[test]
    fn typed_accessors_only_match_their_variant() {
        assert_eq!(PropertyValue::from(42_i64).as_integer(), Some(42));
        assert_eq!(PropertyValue::from("42").as_integer(), None);
        assert_eq!(PropertyValue::from("title").as_str(), Some("title"));
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
    }

    #[test]
    fn untagged_json_shape_is_plain_scalar() {
        let json = serde_json::to_string(&PropertyValue::from(7_i64)).unwrap();
        assert_eq!(json, "7");
        let parsed: PropertyValue = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, PropertyValue::String("en".to_string()));
    }
}
