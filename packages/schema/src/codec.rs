//! # Attribute Codecs
//!
//! Two-way mapping between attribute values and their markup text.
//!
//! A codec is total in both directions: parsing never fails (unusable input
//! becomes `Null`, which the owning [`AttributeSpec`] replaces with its
//! default) and rendering returns `None` when the value contributes no markup.
//!
//! The round-trip law holds for every value a spec produces:
//! `spec.parse(spec.render(&v).as_deref()) == v`.

use crate::extensions::GalleryImage;
use postcraft_model::AttrValue;
use tracing::debug;

/// Shape of a JSON-encoded structured attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// Ordered amplitude samples (`[0.1, 0.5, ...]`)
    Samples,
    /// Ordered gallery entries (`[{id, url, alt?, title?}, ...]`)
    GalleryImages,
}

impl JsonShape {
    fn parse(&self, raw: &str) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            JsonShape::Samples => serde_json::from_str::<Vec<f64>>(raw).and_then(serde_json::to_value),
            JsonShape::GalleryImages => {
                serde_json::from_str::<Vec<GalleryImage>>(raw).and_then(serde_json::to_value)
            }
        }
    }
}

/// Base behaviour of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrCodec {
    /// Free text; empty text is absent
    Text,
    /// Floating point number
    Number,
    /// Whole number
    Integer,
    /// One of a fixed set of keywords
    Enum(&'static [&'static str]),
    /// Structured value stored as JSON text
    Json(JsonShape),
}

impl AttrCodec {
    /// Parse raw markup text. Unusable input yields `Null`.
    pub fn parse(&self, raw: &str) -> AttrValue {
        match self {
            AttrCodec::Text => {
                if raw.is_empty() {
                    AttrValue::Null
                } else {
                    AttrValue::Str(raw.to_string())
                }
            }
            AttrCodec::Number => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => AttrValue::Float(n),
                _ => AttrValue::Null,
            },
            AttrCodec::Integer => {
                let trimmed = raw.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return AttrValue::Int(i);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() && n.fract() == 0.0 => AttrValue::Int(n as i64),
                    _ => AttrValue::Null,
                }
            }
            AttrCodec::Enum(allowed) => {
                if allowed.contains(&raw) {
                    AttrValue::Str(raw.to_string())
                } else {
                    AttrValue::Null
                }
            }
            AttrCodec::Json(shape) => match shape.parse(raw) {
                Ok(value) => AttrValue::Json(value),
                Err(err) => {
                    debug!(error = %err, "Malformed structured attribute, using null");
                    AttrValue::Null
                }
            },
        }
    }

    /// Render a value to markup text with string coercion.
    pub fn render(&self, value: &AttrValue) -> Option<String> {
        match (self, value) {
            (_, AttrValue::Null) => None,
            (AttrCodec::Json(_), AttrValue::Json(v)) => serde_json::to_string(v).ok(),
            (AttrCodec::Json(_), _) => None,
            (_, AttrValue::Str(s)) if s.is_empty() => None,
            (_, AttrValue::Str(s)) => Some(s.clone()),
            (_, AttrValue::Int(i)) => Some(i.to_string()),
            (_, AttrValue::Float(f)) => Some(f.to_string()),
            (_, AttrValue::Bool(b)) => Some(b.to_string()),
            (_, AttrValue::Json(v)) => Some(v.to_string()),
        }
    }
}

/// One declared attribute of a node or mark type
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: String,
    pub codec: AttrCodec,
    pub default: AttrValue,
    markup_name: Option<String>,
    /// Written as a markup attribute
    pub serialize: bool,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, codec: AttrCodec) -> Self {
        Self {
            name: name.into(),
            codec,
            default: AttrValue::Null,
            markup_name: None,
            serialize: true,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, AttrCodec::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, AttrCodec::Number)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, AttrCodec::Integer)
    }

    pub fn one_of(name: impl Into<String>, allowed: &'static [&'static str]) -> Self {
        Self::new(name, AttrCodec::Enum(allowed))
    }

    pub fn json(name: impl Into<String>, shape: JsonShape) -> Self {
        Self::new(name, AttrCodec::Json(shape))
    }

    pub fn with_default(mut self, default: impl Into<AttrValue>) -> Self {
        self.default = default.into();
        self
    }

    /// Use `name` verbatim in markup instead of the `data-` form
    pub fn with_markup_name(mut self, name: impl Into<String>) -> Self {
        self.markup_name = Some(name.into());
        self
    }

    /// Keep out of markup attributes (session-only, or carried by the tag)
    pub fn transient(mut self) -> Self {
        self.serialize = false;
        self
    }

    /// Markup attribute name: explicit override or `data-<kebab-name>`
    pub fn markup_name(&self) -> String {
        match &self.markup_name {
            Some(name) => name.clone(),
            None => format!("data-{}", kebab_case(&self.name)),
        }
    }

    /// CSS property name for style-carried attributes (`fontSize` → `font-size`)
    pub fn style_property(&self) -> String {
        kebab_case(&self.name)
    }

    /// Decode a markup attribute; absent or unusable input yields the default.
    pub fn parse(&self, raw: Option<&str>) -> AttrValue {
        match raw {
            None => self.default.clone(),
            Some(raw) => {
                let value = self.codec.parse(raw);
                if value.is_null() {
                    self.default.clone()
                } else {
                    value
                }
            }
        }
    }

    /// Encode for markup; `None` when the value equals the default or is empty.
    pub fn render(&self, value: &AttrValue) -> Option<String> {
        if *value == self.default {
            return None;
        }
        self.codec.render(value)
    }

    /// Coerce any value into one this spec could have produced
    pub fn normalize(&self, value: &AttrValue) -> AttrValue {
        self.parse(self.render(value).as_deref())
    }
}

pub(crate) fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
