// ==========================================
// tabload - importer layer
// ==========================================
// The ingestion pipeline: parse -> coerce -> key -> resolve -> write.
// ==========================================

pub mod coerce;
pub mod error;
pub mod executor;
pub mod key;
pub mod resolver;
pub mod row_parser;
pub mod schema;

pub use coerce::{ParsedRow, TypeCoercer};
pub use error::{ImportError, ImportResult};
pub use executor::{ImportExecutor, ImportSummary};
pub use key::{CompositeKey, KeyBuilder, KeyPart};
pub use resolver::{DuplicateResolver, StoredRow};
pub use row_parser::{RawRow, RowParser};
pub use schema::{ColumnDef, TableSchema};
