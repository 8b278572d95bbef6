//! Typed field values at the renderer boundary.
//!
//! Templates store values as raw JSON. Rows hand the renderer a
//! [`FieldValue`] tagged with the field kind so it can pick an editor
//! without inspecting the JSON itself. Values whose shape does not match
//! their kind travel as [`FieldValue::Raw`], so converting back with
//! [`FieldValue::into_raw`] never loses anything.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::FieldKind;

/// A field value tagged with the kind of editor that handles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    #[serde(rename = "str")]
    Str(String),
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "float")]
    Float(f64),
    #[serde(rename = "code")]
    Code(String),
    #[serde(rename = "prompt")]
    Prompt(String),
    #[serde(rename = "file")]
    File(String),
    #[serde(rename = "int")]
    Int(i64),
    #[serde(rename = "dict")]
    Dict(Map<String, Value>),
    #[serde(rename = "NestedDict")]
    NestedDict(Map<String, Value>),
    /// Anything whose JSON shape does not fit its declared kind.
    #[serde(rename = "raw")]
    Raw(Value),
}

impl FieldValue {
    /// Tag a raw template value with its field kind.
    pub fn from_raw(kind: FieldKind, raw: &Value) -> Self {
        match (kind, raw) {
            (FieldKind::Str, Value::String(s)) => FieldValue::Str(s.clone()),
            (FieldKind::Code, Value::String(s)) => FieldValue::Code(s.clone()),
            (FieldKind::Prompt, Value::String(s)) => FieldValue::Prompt(s.clone()),
            (FieldKind::File, Value::String(s)) => FieldValue::File(s.clone()),
            (FieldKind::Bool, Value::Bool(b)) => FieldValue::Bool(*b),
            (FieldKind::Int, Value::Number(n)) if n.is_i64() => {
                n.as_i64().map_or_else(|| FieldValue::Raw(raw.clone()), FieldValue::Int)
            }
            (FieldKind::Float, Value::Number(n)) => n
                .as_f64()
                .filter(|number| number.is_finite())
                .map_or_else(|| FieldValue::Raw(raw.clone()), FieldValue::Float),
            (FieldKind::Dict, Value::Object(map)) => FieldValue::Dict(map.clone()),
            (FieldKind::NestedDict, Value::Object(map)) => FieldValue::NestedDict(map.clone()),
            _ => FieldValue::Raw(raw.clone()),
        }
    }

    /// Tag a raw value by type name; unknown type names produce `Raw`.
    pub fn from_type_name(type_name: &str, raw: &Value) -> Self {
        match FieldKind::parse(type_name) {
            Some(kind) => Self::from_raw(kind, raw),
            None => FieldValue::Raw(raw.clone()),
        }
    }

    /// Whether the value can be stored as JSON without loss. Only
    /// non-finite floats fail this.
    pub fn is_representable(&self) -> bool {
        match self {
            FieldValue::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// The kind this value is tagged with; `None` for `Raw`.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Str(_) => Some(FieldKind::Str),
            FieldValue::Bool(_) => Some(FieldKind::Bool),
            FieldValue::Float(_) => Some(FieldKind::Float),
            FieldValue::Code(_) => Some(FieldKind::Code),
            FieldValue::Prompt(_) => Some(FieldKind::Prompt),
            FieldValue::File(_) => Some(FieldKind::File),
            FieldValue::Int(_) => Some(FieldKind::Int),
            FieldValue::Dict(_) => Some(FieldKind::Dict),
            FieldValue::NestedDict(_) => Some(FieldKind::NestedDict),
            FieldValue::Raw(_) => None,
        }
    }

    /// Convert back to the JSON stored in a template.
    pub fn into_raw(self) -> Value {
        match self {
            FieldValue::Str(s)
            | FieldValue::Code(s)
            | FieldValue::Prompt(s)
            | FieldValue::File(s) => Value::String(s),
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Int(i) => Value::from(i),
            FieldValue::Float(f) => float_to_raw(f),
            FieldValue::Dict(map) | FieldValue::NestedDict(map) => Value::Object(map),
            FieldValue::Raw(value) => value,
        }
    }
}

/// Whole floats within the exact integer range are written as JSON
/// integers, so a `float` field holding `1` reads back as `1`.
fn float_to_raw(f: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT {
        Value::from(f as i64)
    } else {
        Value::from(f)
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        value.into_raw()
    }
}
