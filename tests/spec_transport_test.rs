// ==========================================
// Specification transport integration tests
// ==========================================
// JSON specification files loaded through RunConfig, including legacy
// field spellings, driving a real import.
// ==========================================

mod test_helpers;

use std::io::Write;
use std::path::PathBuf;
use tabload::config::RunConfig;
use tabload::importer::error::ImportError;
use tabload::logging;
use tabload::{DuplicateKeyAction, ImportExecutor, MemorySink};
use test_helpers::{numerics, string_key, write_csv};

fn write_spec(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp spec");
    file.write_all(json.as_bytes()).expect("write spec");
    file.flush().expect("flush spec");
    file
}

fn config_for(spec_path: &std::path::Path, data_path: &std::path::Path) -> RunConfig {
    RunConfig::from_args(
        [
            spec_path.to_str().unwrap().to_string(),
            "unused.db".to_string(),
            "measurements".to_string(),
            data_path.to_str().unwrap().to_string(),
        ]
        .into_iter()
        .collect::<Vec<_>>(),
    )
    .unwrap()
}

#[test]
fn test_import_driven_by_spec_file() {
    logging::init_test();

    let spec_file = write_spec(
        r#"{
            "numCols": 3,
            "dimensionCols": [0],
            "dataCols": [1, 2],
            "dimensionNames": ["label", "first", "second"],
            "dimensions": [
                {"type": "string", "units": ""},
                {"type": "numeric", "units": ""},
                {"type": "numeric", "units": ""}
            ],
            "duplicateKeyAction": "average"
        }"#,
    );
    let data = write_csv(&["a,1,10", "a,3,30", "b,5,50"]);

    let config = config_for(spec_file.path(), data.path());
    let spec = config.load_specification().unwrap();
    assert_eq!(spec.duplicate_key_action, DuplicateKeyAction::Average);

    let mut sink = MemorySink::new();
    let summary = ImportExecutor::new(&spec, &config.table)
        .unwrap()
        .run(&mut sink, &config.files)
        .unwrap();

    assert_eq!(summary.imported, 3);
    assert_eq!(
        numerics(sink.get(&string_key(&spec, "a")).unwrap()),
        vec![2.0, 20.0]
    );
}

#[test]
fn test_legacy_spec_spellings_accepted() {
    logging::init_test();

    // "value" dimension type, "av" duplicate action
    let spec_file = write_spec(
        r#"{
            "numCols": 2,
            "dimensionCols": [0],
            "dataCols": [1],
            "dimensions": [
                {"type": "string", "units": ""},
                {"type": "value", "units": ""}
            ],
            "duplicateKeyAction": "av",
            "dontFail": false
        }"#,
    );
    let data = write_csv(&["a,2", "a,4"]);

    let config = config_for(spec_file.path(), data.path());
    let spec = config.load_specification().unwrap();
    assert_eq!(spec.duplicate_key_action, DuplicateKeyAction::Average);

    let mut sink = MemorySink::new();
    ImportExecutor::new(&spec, &config.table)
        .unwrap()
        .run(&mut sink, &config.files)
        .unwrap();
    assert_eq!(
        numerics(sink.get(&string_key(&spec, "a")).unwrap()),
        vec![3.0]
    );
}

#[test]
fn test_inconsistent_spec_file_fails_before_any_row() {
    logging::init_test();

    // column 5 out of range for numCols 2
    let spec_file = write_spec(
        r#"{
            "numCols": 2,
            "dimensionCols": [0],
            "dataCols": [5],
            "dimensions": [
                {"type": "string", "units": ""},
                {"type": "numeric", "units": ""}
            ]
        }"#,
    );
    let data = write_csv(&["a,1"]);

    let config = config_for(spec_file.path(), data.path());
    let err = config.load_specification().unwrap_err();
    assert!(matches!(err, ImportError::Config(_)), "got {:?}", err);
}

#[test]
fn test_spec_file_missing_on_disk() {
    let config = RunConfig {
        spec_path: PathBuf::from("no_such_spec.json"),
        db_path: "unused.db".into(),
        table: "t".into(),
        files: vec![PathBuf::from("unused.csv")],
    };
    let err = config.load_specification().unwrap_err();
    assert!(matches!(err, ImportError::FileRead(_)));
}
