// ==========================================
// tabload - type coercion
// ==========================================
// Converts raw fields into typed values per the column's Dimension.
// Timestamp formats accepted (fixed): %Y-%m-%dT%H:%M:%S,
// %Y-%m-%d %H:%M:%S, and bare %Y-%m-%d (midnight).
// A numeric field exactly matching the configured missingValue marker
// coerces to the NA sentinel instead of failing.
// ==========================================

use crate::domain::dimension::{DimensionType, Value};
use crate::domain::spec::DataSpecification;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One coerced input row, consumed immediately by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based physical row number, for diagnostics.
    pub row: usize,
    /// Coerced values at dimensionCols, ascending column order.
    pub dims: Vec<Value>,
    /// Coerced values at dataCols, ascending column order.
    pub data: Vec<Value>,
}

/// Converts raw fields per the specification's dimensions.
pub struct TypeCoercer<'a> {
    spec: &'a DataSpecification,
}

impl<'a> TypeCoercer<'a> {
    pub fn new(spec: &'a DataSpecification) -> Self {
        Self { spec }
    }

    /// Coerce one field at raw column index `col`.
    pub fn coerce(&self, row: usize, col: usize, raw: &str) -> ImportResult<Value> {
        let field = raw.trim();
        match self.spec.dimensions[col].ty {
            DimensionType::String => Ok(Value::String(field.to_string())),
            DimensionType::Time => parse_timestamp(field)
                .map(Value::Time)
                .ok_or_else(|| ImportError::TypeError {
                    row,
                    column: col,
                    value: field.to_string(),
                    expected: "time",
                }),
            DimensionType::Numeric => {
                if field == self.spec.missing_value {
                    return Ok(Value::Numeric(f64::NAN));
                }
                field
                    .parse::<f64>()
                    .map(Value::Numeric)
                    .map_err(|_| ImportError::TypeError {
                        row,
                        column: col,
                        value: field.to_string(),
                        expected: "numeric",
                    })
            }
        }
    }

    /// Coerce a full raw row into dimension and data values.
    ///
    /// The parser guarantees `fields.len() == numCols`.
    pub fn coerce_row(&self, row: usize, fields: &[String]) -> ImportResult<ParsedRow> {
        let mut dims = Vec::with_capacity(self.spec.dimension_cols.len());
        for &col in self.spec.dimension_cols.iter() {
            dims.push(self.coerce(row, col, &fields[col])?);
        }
        let mut data = Vec::with_capacity(self.spec.data_cols.len());
        for &col in self.spec.data_cols.iter() {
            data.push(self.coerce(row, col, &fields[col])?);
        }
        Ok(ParsedRow { row, dims, data })
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dimension::Dimension;

    fn spec() -> DataSpecification {
        DataSpecification::builder()
            .num_cols(3)
            .dimension_cols([0, 1])
            .data_cols([2])
            .dimensions(vec![
                Dimension::string(),
                Dimension::time(),
                Dimension::numeric(),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn test_string_passes_through_trimmed() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        assert_eq!(
            c.coerce(1, 0, "  hello ").unwrap(),
            Value::String("hello".into())
        );
    }

    #[test]
    fn test_time_formats() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        for raw in ["2024-03-01T12:30:00", "2024-03-01 12:30:00"] {
            let v = c.coerce(1, 1, raw).unwrap();
            assert_eq!(v.to_string(), "2024-03-01 12:30:00");
        }
        let v = c.coerce(1, 1, "2024-03-01").unwrap();
        assert_eq!(v.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_bad_time_is_type_error() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        let err = c.coerce(7, 1, "yesterday").unwrap_err();
        assert!(matches!(err, ImportError::TypeError { row: 7, .. }));
    }

    #[test]
    fn test_numeric_parse() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        assert_eq!(c.coerce(1, 2, "3.25").unwrap(), Value::Numeric(3.25));
        assert_eq!(c.coerce(1, 2, "-1e3").unwrap(), Value::Numeric(-1000.0));
    }

    #[test]
    fn test_missing_marker_maps_to_na() {
        // default marker is the empty string
        let s = spec();
        let c = TypeCoercer::new(&s);
        assert!(c.coerce(1, 2, "").unwrap().is_missing());

        let mut s = spec();
        s.missing_value = "NA".into();
        let c = TypeCoercer::new(&s);
        assert!(c.coerce(1, 2, "NA").unwrap().is_missing());
        // the empty string is no longer the marker, so it fails to parse
        assert!(c.coerce(1, 2, "").is_err());
    }

    #[test]
    fn test_bad_numeric_is_type_error() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        let err = c.coerce(4, 2, "12abc").unwrap_err();
        assert!(matches!(
            err,
            ImportError::TypeError {
                row: 4,
                column: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_coerce_row_splits_dims_and_data() {
        let s = spec();
        let c = TypeCoercer::new(&s);
        let fields: Vec<String> = vec!["a".into(), "2024-01-01".into(), "5".into()];
        let parsed = c.coerce_row(1, &fields).unwrap();
        assert_eq!(parsed.dims.len(), 2);
        assert_eq!(parsed.data, vec![Value::Numeric(5.0)]);
    }
}
