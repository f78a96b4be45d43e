// ==========================================
// tabload - dimension and value types
// ==========================================
// A Dimension declares one column's semantic type and unit; it is
// immutable once attached to a specification. Value is the coerced
// form of a single field.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column.
///
/// Legacy specifications use `"value"` for numeric columns; the alias is
/// accepted on input and written back as `"numeric"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    #[default]
    String,
    Time,
    #[serde(alias = "value")]
    Numeric,
}

/// One column's type/unit declaration, used for coercion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "type", default)]
    pub ty: DimensionType,
    #[serde(default)]
    pub units: String,
}

impl Dimension {
    pub fn new(ty: DimensionType, units: impl Into<String>) -> Self {
        Self {
            ty,
            units: units.into(),
        }
    }

    pub fn string() -> Self {
        Self::new(DimensionType::String, "")
    }

    pub fn time() -> Self {
        Self::new(DimensionType::Time, "")
    }

    pub fn numeric() -> Self {
        Self::new(DimensionType::Numeric, "")
    }
}

/// A coerced field value.
///
/// The not-available numeric sentinel is `f64::NAN`; a missing numeric
/// field coerces to it rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Time(NaiveDateTime),
    Numeric(f64),
}

impl Value {
    /// True for the not-available numeric sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Numeric(v) if v.is_nan())
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Numeric(v) => write!(f, "{}", v),
        }
    }
}
