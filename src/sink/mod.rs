// ==========================================
// tabload - sink layer
// ==========================================
// The table store the executor writes into. SqliteSink is the embedded
// production sink; MemorySink backs tests and dry runs.
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::key::CompositeKey;
use crate::importer::resolver::StoredRow;
use crate::importer::schema::TableSchema;

pub mod memory;
pub mod sqlite;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;

/// Contract the import executor writes against.
///
/// create_table is idempotent: a no-op when an identical table already
/// exists, an error when a conflicting one does. upsert must implement
/// insert-then-replace semantics keyed on the composite key, so
/// re-writing a merged row is safe.
pub trait DatabaseSink {
    fn create_table(&mut self, schema: &TableSchema) -> ImportResult<()>;

    fn upsert(&mut self, key: &CompositeKey, row: &StoredRow) -> ImportResult<()>;

    /// Make every processed row durable. Called once at end of run.
    fn flush(&mut self) -> ImportResult<()>;
}
