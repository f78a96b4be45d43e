// ==========================================
// tabload - in-memory sink
// ==========================================
// Keeps the stored-row set in a map. Used by tests and dry runs.
// ==========================================

use crate::domain::dimension::Value;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::key::CompositeKey;
use crate::importer::resolver::StoredRow;
use crate::importer::schema::TableSchema;
use crate::sink::DatabaseSink;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemorySink {
    schema: Option<TableSchema>,
    rows: HashMap<CompositeKey, Vec<Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&[Value]> {
        self.rows.get(key).map(Vec::as_slice)
    }
}

impl DatabaseSink for MemorySink {
    fn create_table(&mut self, schema: &TableSchema) -> ImportResult<()> {
        match &self.schema {
            None => {
                self.schema = Some(schema.clone());
                Ok(())
            }
            Some(existing) if existing == schema => Ok(()),
            Some(existing) => Err(ImportError::SchemaMismatch {
                table: schema.table.clone(),
                message: format!(
                    "existing columns {:?} != derived columns {:?}",
                    existing.columns, schema.columns
                ),
            }),
        }
    }

    fn upsert(&mut self, key: &CompositeKey, row: &StoredRow) -> ImportResult<()> {
        self.rows.insert(key.clone(), row.data.clone());
        Ok(())
    }

    fn flush(&mut self) -> ImportResult<()> {
        Ok(())
    }
}
