// ==========================================
// tabload - SQLite sink
// ==========================================
// Embedded table store over rusqlite. Writes are batched in
// transactions (commit every BATCH_SIZE upserts) so large imports do
// not pay per-row commit cost; flush() commits whatever is pending.
// ==========================================

use crate::domain::dimension::Value;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::key::CompositeKey;
use crate::importer::resolver::StoredRow;
use crate::importer::schema::{quote_ident, TableSchema};
use crate::sink::DatabaseSink;
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};
use tracing::{debug, info};

/// Rows per transaction.
pub const BATCH_SIZE: usize = 1000;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::String(s) => Ok(ToSqlOutput::from(s.as_str())),
            Value::Time(t) => Ok(ToSqlOutput::from(t.format("%Y-%m-%d %H:%M:%S").to_string())),
            // the NA sentinel maps to SQL NULL
            Value::Numeric(v) if v.is_nan() => Null.to_sql(),
            Value::Numeric(v) => Ok(ToSqlOutput::from(*v)),
        }
    }
}

pub struct SqliteSink {
    conn: Connection,
    table: Option<String>,
    upsert_sql: Option<String>,
    has_key_columns: bool,
    pending: usize,
    in_tx: bool,
}

impl SqliteSink {
    /// Connect to a SQLite database file, applying the standard PRAGMAs.
    ///
    /// Connectivity failures are fatal and reported before any row
    /// processing begins.
    pub fn connect(db_path: &str) -> ImportResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;
        info!(db_path = %db_path, "connected to sink database");
        Ok(Self::with_connection(conn))
    }

    /// Wrap an existing connection (e.g. an in-memory database in tests).
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            table: None,
            upsert_sql: None,
            has_key_columns: false,
            pending: 0,
            in_tx: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin_if_needed(&mut self) -> ImportResult<()> {
        if !self.in_tx {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.in_tx = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> ImportResult<()> {
        if self.in_tx {
            self.conn.execute_batch("COMMIT")?;
            self.in_tx = false;
            debug!(pending = self.pending, "committed batch");
            self.pending = 0;
        }
        Ok(())
    }

    /// Column definitions of an existing table, via pragma table_info.
    fn existing_columns(&self, table: &str) -> ImportResult<Option<Vec<(String, String, bool)>>> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let cols = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let ty: String = row.get(2)?;
                let pk: i64 = row.get(5)?;
                Ok((name, ty, pk > 0))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(cols))
    }

    fn build_upsert_sql(schema: &TableSchema) -> String {
        let all: Vec<String> = schema
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect();
        let placeholders: Vec<String> = (1..=all.len()).map(|i| format!("?{}", i)).collect();
        let keys: Vec<String> = schema.key_columns().map(|c| quote_ident(&c.name)).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&schema.table),
            all.join(", "),
            placeholders.join(", ")
        );
        if keys.is_empty() {
            return sql;
        }
        let updates: Vec<String> = schema
            .data_columns()
            .map(|c| {
                let q = quote_ident(&c.name);
                format!("{} = excluded.{}", q, q)
            })
            .collect();
        if updates.is_empty() {
            sql.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", keys.join(", ")));
        } else {
            sql.push_str(&format!(
                " ON CONFLICT ({}) DO UPDATE SET {}",
                keys.join(", "),
                updates.join(", ")
            ));
        }
        sql
    }
}

impl DatabaseSink for SqliteSink {
    /// Create the target table if absent. An existing identical table is
    /// a no-op; a conflicting one is a configuration error, never
    /// silently reconciled.
    fn create_table(&mut self, schema: &TableSchema) -> ImportResult<()> {
        match self.existing_columns(&schema.table)? {
            None => {
                self.conn.execute_batch(&schema.create_table_sql())?;
                info!(table = %schema.table, columns = schema.columns.len(), "created table");
            }
            Some(existing) => {
                let derived: Vec<(String, String, bool)> = schema
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.sql_type.to_string(), c.key))
                    .collect();
                if existing != derived {
                    return Err(ImportError::SchemaMismatch {
                        table: schema.table.clone(),
                        message: format!("existing {:?} != derived {:?}", existing, derived),
                    });
                }
                debug!(table = %schema.table, "table already exists with identical schema");
            }
        }
        self.table = Some(schema.table.clone());
        self.upsert_sql = Some(Self::build_upsert_sql(schema));
        self.has_key_columns = schema.key_columns().next().is_some();
        Ok(())
    }

    fn upsert(&mut self, key: &CompositeKey, row: &StoredRow) -> ImportResult<()> {
        self.begin_if_needed()?;
        if !self.has_key_columns {
            // degenerate keyless table: every row replaces the single
            // stored row
            if let Some(table) = self.table.as_deref() {
                let delete = format!("DELETE FROM {}", quote_ident(table));
                self.conn.execute(&delete, [])?;
            }
        }
        let params: Vec<Value> = key
            .parts()
            .iter()
            .map(|p| p.to_value())
            .chain(row.data.iter().cloned())
            .collect();
        let sql = self
            .upsert_sql
            .as_ref()
            .ok_or_else(|| ImportError::Config("create_table must be called first".into()))?;
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.execute(params_from_iter(params.iter()))?;
        drop(stmt);
        self.pending += 1;
        if self.pending >= BATCH_SIZE {
            self.commit()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> ImportResult<()> {
        self.commit()
    }
}
