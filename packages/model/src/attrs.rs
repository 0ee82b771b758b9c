//! Attribute values carried by elements and marks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag of a node or mark.
///
/// Ordered so that serialization and structural comparison are deterministic.
pub type Attrs = BTreeMap<String, AttrValue>;

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Structured value (sample lists, image lists)
    Json(serde_json::Value),
}

pub(crate) static NULL: AttrValue = AttrValue::Null;

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            AttrValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<serde_json::Value> for AttrValue {
    fn from(v: serde_json::Value) -> Self {
        AttrValue::Json(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

/// Build an [`Attrs`] map from `key => value` pairs.
///
/// ```
/// use postcraft_model::{attrs, AttrValue};
///
/// let a = attrs! { "src" => "cat.png", "width" => 320.0 };
/// assert_eq!(a["width"], AttrValue::Float(320.0));
/// ```
#[macro_export]
macro_rules! attrs {
    () => { $crate::Attrs::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Attrs::new();
        $( map.insert(String::from($key), $crate::AttrValue::from($value)); )+
        map
    }};
}
