//! Raw tabular input
//!
//! The engine works on already-parsed exports: an ordered header list and
//! rows of string cells. CSV files are read with the `csv` crate.

use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// A parsed export, before header resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table; rows shorter than the header are padded with empty cells
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Build a table from header-to-value maps. The header order is the
    /// order in which keys are first seen.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = IndexMap<String, String>>,
    {
        let records: Vec<_> = records.into_iter().collect();
        let mut headers: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::new(headers, rows)
    }

    /// Read a CSV export with a header row
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(Error::InputError("Export has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a CSV export from disk
pub fn read_csv(path: &Path, delimiter: u8) -> Result<RawTable> {
    let file = File::open(path).map_err(|e| {
        Error::InputError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let table = RawTable::from_reader(BufReader::new(file), delimiter)?;
    tracing::debug!(path = %path.display(), rows = table.len(), "Read schema export");
    Ok(table)
}

/// Parse a delimiter argument: a single character, or `tab`
pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        other => Err(Error::InputError(format!("Invalid delimiter: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_csv_and_pads_short_rows() {
        let data = "Table Name,Column Name,Data Type\nusers,id,int\nusers,name\n";
        let table = RawTable::from_reader(data.as_bytes(), b',').unwrap();

        assert_eq!(table.headers(), ["Table Name", "Column Name", "Data Type"]);
        assert_eq!(table.rows()[1], vec!["users", "name", ""]);
    }

    #[test]
    fn from_records_unions_keys_in_first_seen_order() {
        let mut first = IndexMap::new();
        first.insert("table".to_string(), "users".to_string());
        first.insert("column".to_string(), "id".to_string());
        let mut second = IndexMap::new();
        second.insert("table".to_string(), "users".to_string());
        second.insert("type".to_string(), "int".to_string());
        second.insert("column".to_string(), "age".to_string());

        let table = RawTable::from_records([first, second]);

        assert_eq!(table.headers(), ["table", "column", "type"]);
        assert_eq!(table.rows()[0], vec!["users", "id", ""]);
        assert_eq!(table.rows()[1], vec!["users", "age", "int"]);
    }

    #[test]
    fn delimiter_parsing() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter("::").is_err());
    }
}
