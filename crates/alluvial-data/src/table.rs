use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::DataError;

/// Ordered categorical columns plus string rows, as loaded from CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read CSV whose first record is the header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let rows = read_rows(&mut csv_reader)?;
        Self::build(columns, rows)
    }

    /// Read headerless CSV with caller-supplied column names.
    pub fn from_reader_with_columns<R: Read>(
        reader: R,
        columns: Vec<String>,
    ) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let rows = read_rows(&mut csv_reader)?;
        Self::build(columns, rows)
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        Self::from_reader(open(path)?)
    }

    pub fn from_path_with_columns(path: &Path, columns: Vec<String>) -> Result<Self, DataError> {
        Self::from_reader_with_columns(open(path)?, columns)
    }

    fn build(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DataError> {
        if columns.is_empty() {
            return Err(DataError::EmptyTable);
        }
        tracing::debug!(columns = columns.len(), rows = rows.len(), "loaded table");
        Ok(Self { columns, rows })
    }
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_rows<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Vec<String>>, DataError> {
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
