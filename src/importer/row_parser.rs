// ==========================================
// tabload - row parser
// ==========================================
// Tokenizes delimited input into raw string fields using the
// specification's separator/quote/escape configuration. The first
// dataRowOffset physical rows of each input are always skipped as
// header/metadata and never counted as failures.
// ==========================================

use crate::domain::spec::DataSpecification;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::io::Read;

/// A tokenized input row, fixed arity equal to numCols.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based physical row number within the file, headers included.
    pub row: usize,
    pub fields: Vec<String>,
}

/// Splits one input stream into raw rows per the specification.
pub struct RowParser {
    num_cols: usize,
    data_row_offset: usize,
    separator: u8,
    quote: u8,
    escape: Option<u8>,
}

impl RowParser {
    pub fn from_spec(spec: &DataSpecification) -> ImportResult<Self> {
        // validated specs only carry ASCII delimiters
        spec.validate()?;
        // '\0' disables the escape character; doubled quotes still parse.
        // An escape equal to the quote is the doubled-quote scheme itself.
        let escape = match spec.escape {
            '\0' => None,
            c if c == spec.quote => None,
            c => Some(c as u8),
        };
        Ok(Self {
            num_cols: spec.num_cols,
            data_row_offset: spec.data_row_offset,
            separator: spec.separator as u8,
            quote: spec.quote as u8,
            escape,
        })
    }

    /// Iterate raw rows of one input, header rows already skipped.
    pub fn rows<R: Read>(&self, input: R) -> RawRows<R> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // arity is checked here, not by the reader
            .delimiter(self.separator)
            .quote(self.quote)
            .escape(self.escape)
            .from_reader(input);
        RawRows {
            inner: reader.into_records(),
            num_cols: self.num_cols,
            skip: self.data_row_offset,
            row: 0,
        }
    }
}

/// Iterator over the data rows of one input.
pub struct RawRows<R: Read> {
    inner: csv::StringRecordsIntoIter<R>,
    num_cols: usize,
    skip: usize,
    row: usize,
}

impl<R: Read> Iterator for RawRows<R> {
    type Item = ImportResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.inner.next()?;
            self.row += 1;
            if self.row <= self.skip {
                continue; // header/metadata row
            }
            return Some(match record {
                Err(e) => Err(ImportError::from(e)),
                Ok(rec) => {
                    if rec.len() != self.num_cols {
                        Err(ImportError::MalformedRow {
                            row: self.row,
                            expected: self.num_cols,
                            found: rec.len(),
                        })
                    } else {
                        Ok(RawRow {
                            row: self.row,
                            fields: rec.iter().map(|f| f.to_string()).collect(),
                        })
                    }
                }
            });
        }
    }
}
