// ==========================================
// tabload - run configuration
// ==========================================
// Everything the CLI needs for one import run: the specification file,
// the sink database, the target table and the input files.
// ==========================================

use crate::domain::spec::DataSpecification;
use crate::importer::error::{ImportError, ImportResult};
use std::fs;
use std::path::PathBuf;

pub const USAGE: &str = "usage: tabload <spec.json> <database> <table> <file.csv>...";

/// Parsed command line for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub spec_path: PathBuf,
    pub db_path: String,
    pub table: String,
    pub files: Vec<PathBuf>,
}

impl RunConfig {
    /// Parse the argument list (program name already stripped).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> ImportResult<Self> {
        let mut args = args.into_iter();
        let spec_path = args
            .next()
            .ok_or_else(|| ImportError::Config(USAGE.into()))?;
        let db_path = args
            .next()
            .ok_or_else(|| ImportError::Config(USAGE.into()))?;
        let table = args
            .next()
            .ok_or_else(|| ImportError::Config(USAGE.into()))?;
        let files: Vec<PathBuf> = args.map(PathBuf::from).collect();
        if files.is_empty() {
            return Err(ImportError::Config(USAGE.into()));
        }
        Ok(Self {
            spec_path: PathBuf::from(spec_path),
            db_path,
            table,
            files,
        })
    }

    /// Load and validate the specification from its JSON file.
    pub fn load_specification(&self) -> ImportResult<DataSpecification> {
        let json = fs::read_to_string(&self.spec_path).map_err(|e| {
            ImportError::FileRead(format!("{}: {}", self.spec_path.display(), e))
        })?;
        DataSpecification::from_json(&json)
    }
}
