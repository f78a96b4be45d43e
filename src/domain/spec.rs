// ==========================================
// tabload - data specification
// ==========================================
// Declares, for one file family, which columns are data values vs.
// key/dimension columns, their types, offsets, and the duplicate/error
// policy. Built through DataSpecificationBuilder, which validates all
// cross-field invariants up front; an inconsistent specification is a
// configuration error at build time, never at import time.
// ==========================================

use crate::domain::dimension::Dimension;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Policy applied when two input rows produce the same composite key.
///
/// Legacy specifications use `"throwException"` and `"av"`; both aliases
/// are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKeyAction {
    /// Second row with the same key aborts the import. Fatal regardless
    /// of dontFail.
    #[default]
    #[serde(alias = "throwException")]
    Error,
    /// Later rows replace the stored row's values entirely.
    Overwrite,
    /// Numeric data columns become the running arithmetic mean; other
    /// columns fall back to overwrite.
    #[serde(alias = "av")]
    Average,
    /// First row for a key wins; later rows are silently discarded.
    Ignore,
}

fn default_separator() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_escape() -> char {
    '\\'
}

/// Per-dataset import specification.
///
/// Serializes to a flat JSON record with camelCase field names. All
/// fields are optional on input except `numCols` and `dimensions`.
/// Columns in neither `dataCols` nor `dimensionCols` are ignored
/// (neither key nor value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSpecification {
    /// Total input columns; must be >= 1.
    pub num_cols: usize,

    /// Leading rows of each file to skip as headers/metadata.
    #[serde(default)]
    pub data_row_offset: usize,

    /// Indices of pure value columns, disjoint from dimension_cols.
    #[serde(default)]
    pub data_cols: BTreeSet<usize>,

    /// Indices of key/grouping columns.
    #[serde(default)]
    pub dimension_cols: BTreeSet<usize>,

    /// Human labels, one per selected column in ascending column order.
    /// Generated (`col{i}`) when absent.
    #[serde(default)]
    pub dimension_names: Vec<String>,

    /// One Dimension per input column, indexable by raw column index.
    pub dimensions: Vec<Dimension>,

    #[serde(default)]
    pub duplicate_key_action: DuplicateKeyAction,

    /// If true, a row that fails to parse or coerce is skipped and
    /// counted; if false, the first such failure aborts the run.
    #[serde(default)]
    pub dont_fail: bool,

    #[serde(default = "default_separator")]
    pub separator: char,

    #[serde(default = "default_quote")]
    pub quote: char,

    /// Escape character inside quoted fields; '\0' disables escaping
    /// (doubled quotes still work).
    #[serde(default = "default_escape")]
    pub escape: char,

    /// Marker matched exactly against a raw numeric field to mean
    /// not-available (e.g. "" or "NaN").
    #[serde(default)]
    pub missing_value: String,
}

impl DataSpecification {
    pub fn builder() -> DataSpecificationBuilder {
        DataSpecificationBuilder::default()
    }

    /// Selected columns (dimension and data) in ascending column order.
    pub fn selected_cols(&self) -> Vec<usize> {
        self.dimension_cols
            .union(&self.data_cols)
            .copied()
            .collect()
    }

    /// Label for a selected column.
    ///
    /// Position within the ascending union of dimension_cols and
    /// data_cols indexes into dimension_names. Only valid for selected
    /// columns of a validated specification.
    pub fn name_of(&self, col: usize) -> Option<&str> {
        let pos = self.selected_cols().iter().position(|&c| c == col)?;
        self.dimension_names.get(pos).map(String::as_str)
    }

    /// Parse a specification from its JSON transport record and
    /// re-validate it through the builder invariants.
    pub fn from_json(json: &str) -> ImportResult<Self> {
        let mut spec: DataSpecification = serde_json::from_str(json)
            .map_err(|e| ImportError::Config(format!("specification JSON: {}", e)))?;
        if spec.dimension_names.is_empty() {
            spec.dimension_names = generated_names(&spec);
        }
        spec.validate()?;
        Ok(spec)
    }

    pub fn to_json(&self) -> ImportResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ImportError::Config(format!("specification JSON: {}", e)))
    }

    /// Check every cross-field invariant. Violations are configuration
    /// errors, surfaced before any row is read.
    pub fn validate(&self) -> ImportResult<()> {
        if self.num_cols < 1 {
            return Err(ImportError::Config("numCols must be >= 1".into()));
        }
        if self.dimensions.len() != self.num_cols {
            return Err(ImportError::Config(format!(
                "dimensions has {} entries but numCols is {}",
                self.dimensions.len(),
                self.num_cols
            )));
        }
        for &c in self.data_cols.iter().chain(self.dimension_cols.iter()) {
            if c >= self.num_cols {
                return Err(ImportError::Config(format!(
                    "column index {} out of range (numCols = {})",
                    c, self.num_cols
                )));
            }
        }
        if let Some(&c) = self.data_cols.intersection(&self.dimension_cols).next() {
            return Err(ImportError::Config(format!(
                "column {} is listed in both dataCols and dimensionCols",
                c
            )));
        }
        let selected = self.dimension_cols.len() + self.data_cols.len();
        if self.dimension_names.len() != selected {
            return Err(ImportError::Config(format!(
                "dimensionNames has {} entries but {} columns are selected",
                self.dimension_names.len(),
                selected
            )));
        }
        for &c in [self.separator, self.quote].iter() {
            if !c.is_ascii() {
                return Err(ImportError::Config(format!(
                    "separator and quote must be ASCII, got {:?}",
                    c
                )));
            }
        }
        if !self.escape.is_ascii() {
            return Err(ImportError::Config(format!(
                "escape must be ASCII, got {:?}",
                self.escape
            )));
        }
        Ok(())
    }
}

fn generated_names(spec: &DataSpecification) -> Vec<String> {
    spec.dimension_cols
        .union(&spec.data_cols)
        .map(|c| format!("col{}", c))
        .collect()
}

// ==========================================
// DataSpecificationBuilder
// ==========================================
// Setter-style construction, but with every cross-field invariant
// checked at build() so inconsistencies fail fast as ConfigError
// rather than surfacing as coercion mismatches mid-import.
#[derive(Debug, Clone, Default)]
pub struct DataSpecificationBuilder {
    num_cols: usize,
    data_row_offset: usize,
    data_cols: BTreeSet<usize>,
    dimension_cols: BTreeSet<usize>,
    dimension_names: Vec<String>,
    dimensions: Vec<Dimension>,
    duplicate_key_action: DuplicateKeyAction,
    dont_fail: bool,
    separator: Option<char>,
    quote: Option<char>,
    escape: Option<char>,
    missing_value: String,
}

impl DataSpecificationBuilder {
    pub fn num_cols(mut self, n: usize) -> Self {
        self.num_cols = n;
        self
    }

    pub fn data_row_offset(mut self, rows: usize) -> Self {
        self.data_row_offset = rows;
        self
    }

    pub fn data_cols(mut self, cols: impl IntoIterator<Item = usize>) -> Self {
        self.data_cols = cols.into_iter().collect();
        self
    }

    pub fn dimension_cols(mut self, cols: impl IntoIterator<Item = usize>) -> Self {
        self.dimension_cols = cols.into_iter().collect();
        self
    }

    pub fn dimension_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dimension_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Declare all column dimensions at once; length must equal numCols.
    pub fn dimensions(mut self, dims: Vec<Dimension>) -> Self {
        self.dimensions = dims;
        self
    }

    /// Override the dimension of a single column.
    pub fn dimension_at(mut self, col: usize, dim: Dimension) -> Self {
        if col < self.dimensions.len() {
            self.dimensions[col] = dim;
        }
        self
    }

    pub fn duplicate_key_action(mut self, action: DuplicateKeyAction) -> Self {
        self.duplicate_key_action = action;
        self
    }

    pub fn dont_fail(mut self, dont_fail: bool) -> Self {
        self.dont_fail = dont_fail;
        self
    }

    pub fn separator(mut self, c: char) -> Self {
        self.separator = Some(c);
        self
    }

    pub fn quote(mut self, c: char) -> Self {
        self.quote = Some(c);
        self
    }

    pub fn escape(mut self, c: char) -> Self {
        self.escape = Some(c);
        self
    }

    pub fn missing_value(mut self, marker: impl Into<String>) -> Self {
        self.missing_value = marker.into();
        self
    }

    /// Validate and produce the immutable specification.
    pub fn build(self) -> ImportResult<DataSpecification> {
        let mut spec = DataSpecification {
            num_cols: self.num_cols,
            data_row_offset: self.data_row_offset,
            data_cols: self.data_cols,
            dimension_cols: self.dimension_cols,
            dimension_names: self.dimension_names,
            dimensions: self.dimensions,
            duplicate_key_action: self.duplicate_key_action,
            dont_fail: self.dont_fail,
            separator: self.separator.unwrap_or_else(default_separator),
            quote: self.quote.unwrap_or_else(default_quote),
            escape: self.escape.unwrap_or_else(default_escape),
            missing_value: self.missing_value,
        };
        if spec.dimension_names.is_empty() {
            spec.dimension_names = generated_names(&spec);
        }
        spec.validate()?;
        Ok(spec)
    }
}
