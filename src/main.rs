// ==========================================
// tabload - CLI entry point
// ==========================================
// Accepts one specification and one-or-more file paths; exit status
// reflects whether the run completed (0) or aborted fatally (non-zero).
// ==========================================

use std::process::ExitCode;
use tabload::config::RunConfig;
use tabload::importer::error::ImportResult;
use tabload::importer::executor::{ImportExecutor, ImportSummary};
use tabload::logging;
use tabload::sink::SqliteSink;

fn run() -> ImportResult<ImportSummary> {
    let config = RunConfig::from_args(std::env::args().skip(1))?;
    let spec = config.load_specification()?;

    tracing::info!(
        spec = %config.spec_path.display(),
        db = %config.db_path,
        table = %config.table,
        files = config.files.len(),
        "starting import"
    );

    let mut sink = SqliteSink::connect(&config.db_path)?;
    let executor = ImportExecutor::new(&spec, &config.table)?;
    executor.run(&mut sink, &config.files)
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "import aborted");
            eprintln!("tabload: {}", e);
            ExitCode::FAILURE
        }
    }
}
