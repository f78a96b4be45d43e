// ==========================================
// tabload - composite keys
// ==========================================
// Composes the dimension-column values of a parsed row into the
// composite key identifying its logical entity. Two rows are duplicates
// iff their keys compare equal per-field: numeric equality for numeric
// dimensions (with -0.0 == 0.0 and NA == NA), exact match otherwise.
// ==========================================

use crate::domain::dimension::Value;
use crate::domain::spec::DataSpecification;
use crate::importer::coerce::ParsedRow;
use chrono::NaiveDateTime;
use std::fmt;

/// One component of a composite key.
///
/// Numeric parts are stored as a normalised bit pattern so the key is
/// hashable: -0.0 folds onto 0.0 and every NaN onto the canonical NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    String(String),
    Time(NaiveDateTime),
    Numeric(u64),
}

impl KeyPart {
    fn from_value(v: &Value) -> Self {
        match v {
            Value::String(s) => KeyPart::String(s.clone()),
            Value::Time(t) => KeyPart::Time(*t),
            Value::Numeric(x) => KeyPart::Numeric(normalised_bits(*x)),
        }
    }

    /// Recover the typed value, for binding key columns on writes.
    pub fn to_value(&self) -> Value {
        match self {
            KeyPart::String(s) => Value::String(s.clone()),
            KeyPart::Time(t) => Value::Time(*t),
            KeyPart::Numeric(bits) => Value::Numeric(f64::from_bits(*bits)),
        }
    }
}

fn normalised_bits(x: f64) -> u64 {
    if x == 0.0 {
        0.0f64.to_bits()
    } else if x.is_nan() {
        f64::NAN.to_bits()
    } else {
        x.to_bits()
    }
}

/// Ordered tuple of a row's dimension-column values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(Vec<KeyPart>);

impl CompositeKey {
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.0 {
            write!(f, ":{}", part.to_value())?;
        }
        Ok(())
    }
}

/// Builds composite keys in declared dimension-column order.
pub struct KeyBuilder {
    arity: usize,
}

impl KeyBuilder {
    pub fn from_spec(spec: &DataSpecification) -> Self {
        Self {
            arity: spec.dimension_cols.len(),
        }
    }

    /// Key for a parsed row. The coercer produces `dims` in declared
    /// column order, which is exactly the key order.
    pub fn key_for(&self, row: &ParsedRow) -> CompositeKey {
        debug_assert_eq!(row.dims.len(), self.arity);
        CompositeKey(row.dims.iter().map(KeyPart::from_value).collect())
    }
}
