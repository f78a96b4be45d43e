// ==========================================
// Shared helpers for integration tests
// ==========================================

#![allow(dead_code)]

use std::io::Write;
use tabload::importer::coerce::ParsedRow;
use tabload::importer::key::{CompositeKey, KeyBuilder};
use tabload::{DataSpecification, Dimension, DuplicateKeyAction, Value};
use tempfile::NamedTempFile;

/// Specification for a (label, numeric, numeric) file keyed on column 0.
pub fn label_two_values_spec(action: DuplicateKeyAction) -> DataSpecification {
    DataSpecification::builder()
        .num_cols(3)
        .dimension_cols([0])
        .data_cols([1, 2])
        .dimension_names(["label", "first", "second"])
        .dimensions(vec![
            Dimension::string(),
            Dimension::numeric(),
            Dimension::numeric(),
        ])
        .duplicate_key_action(action)
        .build()
        .expect("valid test spec")
}

/// Write a temp CSV file from literal lines.
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    for line in lines {
        writeln!(file, "{}", line).expect("write csv line");
    }
    file.flush().expect("flush csv");
    file
}

/// Composite key for a single string-label dimension.
pub fn string_key(spec: &DataSpecification, label: &str) -> CompositeKey {
    KeyBuilder::from_spec(spec).key_for(&ParsedRow {
        row: 1,
        dims: vec![Value::String(label.to_string())],
        data: vec![],
    })
}

/// Numeric data values of a stored row.
pub fn numerics(values: &[Value]) -> Vec<f64> {
    values
        .iter()
        .map(|v| v.as_numeric().expect("numeric value"))
        .collect()
}
