//! Attribute values attached to variables and datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value.
///
/// NetCDF attributes come in many numeric widths; they are widened to
/// `i64`/`f64` here since nothing downstream depends on the stored width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Numeric view of the attribute, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Text view of the attribute, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(AttrValue::from(-128).as_f64(), Some(-128.0));
        assert_eq!(AttrValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(AttrValue::from("1 = sea").as_f64(), None);
        assert_eq!(AttrValue::from("1 = sea").as_str(), Some("1 = sea"));
    }

    #[test]
    fn test_untagged_json() {
        let values = vec![AttrValue::from(3), AttrValue::from(0.5), AttrValue::from("m")];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[3,0.5,"m"]"#);

        let back: Vec<AttrValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
