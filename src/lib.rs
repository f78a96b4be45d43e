// ==========================================
// tabload - core library
// ==========================================
// Declarative ingestion of delimited text files into typed SQL tables.
// One DataSpecification per logical dataset drives the whole pipeline:
// parse -> coerce -> key -> resolve duplicates -> sink write.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - specification and value types
pub mod domain;

// Importer layer - the ingestion pipeline
pub mod importer;

// Sink layer - table stores the executor writes into
pub mod sink;

// Run configuration - CLI-facing config
pub mod config;

// Database infrastructure (connection init / PRAGMA in one place)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports of core types
// ==========================================

pub use domain::dimension::{Dimension, DimensionType, Value};
pub use domain::spec::{DataSpecification, DataSpecificationBuilder, DuplicateKeyAction};

pub use importer::error::{ImportError, ImportResult};
pub use importer::executor::{ImportExecutor, ImportSummary};
pub use importer::key::{CompositeKey, KeyBuilder};
pub use importer::resolver::{DuplicateResolver, StoredRow};
pub use importer::schema::{ColumnDef, TableSchema};

pub use sink::{DatabaseSink, MemorySink, SqliteSink};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Application name
pub const APP_NAME: &str = "tabload";
