// ==========================================
// tabload - import executor
// ==========================================
// Orchestrates one import run: open file(s) -> parse rows -> coerce ->
// key -> resolve duplicates -> write to sink, enforcing the fail/skip
// policy. The pipeline is a strictly ordered fold: files in the order
// given, lines within a file in physical order, because the duplicate
// policies are order-sensitive. The resolver-to-sink step is the
// serialization point of the design.
// ==========================================

use crate::domain::spec::DataSpecification;
use crate::importer::coerce::TypeCoercer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::key::KeyBuilder;
use crate::importer::resolver::DuplicateResolver;
use crate::importer::row_parser::RowParser;
use crate::importer::schema::TableSchema;
use crate::sink::DatabaseSink;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows parsed, coerced and applied to the stored-row set.
    pub imported: u64,
    /// Rows dropped under dontFail=true (parse or coercion failures).
    pub skipped: u64,
    /// Rows discarded by the ignore duplicate policy (not failures).
    pub ignored: u64,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "imported {} rows, skipped {}, ignored {}",
            self.imported, self.skipped, self.ignored
        )
    }
}

/// Runs one import of an ordered file set into one table.
///
/// Owns all per-run state (resolver map, counters); the specification is
/// immutable for the duration of the run. A run either completes or
/// aborts fatally; rows already flushed to the sink are not rolled back
/// (at-least-once, not atomic).
pub struct ImportExecutor<'a> {
    spec: &'a DataSpecification,
    table: String,
}

impl<'a> ImportExecutor<'a> {
    /// The specification must already be validated (builder or
    /// from_json); re-validation here keeps misuse a ConfigError rather
    /// than a row-processing surprise.
    pub fn new(spec: &'a DataSpecification, table: impl Into<String>) -> ImportResult<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            table: table.into(),
        })
    }

    /// Import `files` in order into the sink.
    #[instrument(skip(self, sink, files), fields(run_id, table = %self.table))]
    pub fn run<S: DatabaseSink, P: AsRef<Path>>(
        &self,
        sink: &mut S,
        files: &[P],
    ) -> ImportResult<ImportSummary> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        // schema derivation and table creation happen before any row is
        // read; sink failures here abort the run up front
        let schema = TableSchema::derive(&self.table, self.spec)?;
        sink.create_table(&schema)?;

        let parser = RowParser::from_spec(self.spec)?;
        let coercer = TypeCoercer::new(self.spec);
        let keys = KeyBuilder::from_spec(self.spec);
        let mut resolver = DuplicateResolver::new(self.spec.duplicate_key_action);
        let mut summary = ImportSummary::default();

        for file in files {
            let path: PathBuf = file.as_ref().to_path_buf();
            info!(file = %path.display(), "importing file");
            let input = File::open(&path).map_err(|e| {
                ImportError::FileRead(format!("{}: {}", path.display(), e))
            })?;

            for item in parser.rows(BufReader::new(input)) {
                let outcome = item.and_then(|raw| coercer.coerce_row(raw.row, &raw.fields));
                let parsed = match outcome {
                    Ok(parsed) => parsed,
                    Err(e) if e.is_row_error() && self.spec.dont_fail => {
                        warn!(file = %path.display(), error = %e, "skipping row");
                        summary.skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let key = keys.key_for(&parsed);
                match resolver.apply(&key, parsed.data)? {
                    Some(stored) => {
                        sink.upsert(&key, stored)?;
                        summary.imported += 1;
                    }
                    None => summary.ignored += 1,
                }

                if summary.imported % 10_000 == 0 && summary.imported > 0 {
                    debug!(imported = summary.imported, "progress");
                }
            }
        }

        sink.flush()?;
        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            ignored = summary.ignored,
            keys = resolver.len(),
            "import complete"
        );
        Ok(summary)
    }
}
