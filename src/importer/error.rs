// ==========================================
// tabload - importer error types
// ==========================================
// thiserror derive; one taxonomy for the whole pipeline.
// Recoverability: per-row failures (MalformedRow, TypeError, per-record
// CSV errors) are skippable under dontFail=true; everything else aborts
// the run.
// ==========================================

use thiserror::Error;

/// Importer error taxonomy.
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Configuration errors (always fatal, surface at build time) =====
    #[error("invalid specification: {0}")]
    Config(String),

    #[error("table {table} already exists with a conflicting schema: {message}")]
    SchemaMismatch { table: String, message: String },

    // ===== Per-row errors (recoverable under dontFail=true) =====
    #[error("malformed row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("type error at row {row}, column {column}: cannot read {value:?} as {expected}")]
    TypeError {
        row: usize,
        column: usize,
        value: String,
        expected: &'static str,
    },

    #[error("CSV record error: {0}")]
    CsvRecord(String),

    // ===== Duplicate keys (fatal under the `error` policy, regardless of dontFail) =====
    #[error("duplicate key {0}")]
    DuplicateKey(String),

    // ===== File errors =====
    #[error("file read failed: {0}")]
    FileRead(String),

    // ===== Database errors (always fatal) =====
    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database write failed: {0}")]
    DatabaseQueryError(String),

    // ===== Catch-all =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// True for failures confined to a single row, which dontFail=true
    /// turns into a skip instead of an abort.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            ImportError::MalformedRow { .. }
                | ImportError::TypeError { .. }
                | ImportError::CsvRecord(_)
        )
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileRead(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ImportError::FileRead(err.to_string())
        } else {
            ImportError::CsvRecord(err.to_string())
        }
    }
}

/// Result alias for the importer.
pub type ImportResult<T> = Result<T, ImportError>;
