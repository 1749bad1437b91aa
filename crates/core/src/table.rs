//! Delimited table I/O.
//!
//! Tables are read entirely into memory as ordered string rows and written back once, after
//! every row has been processed. Rows may gain columns during enrichment, so the writer emits
//! the ordered union of all columns: input headers first, then new columns in the order they
//! first appear. Cells a row does not carry are written empty.

use crate::constants::TABLE_DELIMITER;
use crate::error::{EnrichError, EnrichResult};
use drugchem_types::{is_missing, LookupTerm};
use std::fs;
use std::path::Path;

/// Character encoding of the input table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
}

impl std::str::FromStr for InputEncoding {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(InputEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(InputEncoding::Latin1),
            other => Err(EnrichError::InvalidInput(format!(
                "unknown input encoding '{other}' (expected utf-8 or latin-1)"
            ))),
        }
    }
}

/// One table row: ordered `(column, value)` cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of a column, if the row carries it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// `true` when the column exists and holds a non-missing value.
    pub fn is_populated(&self, column: &str) -> bool {
        self.get(column).is_some_and(|v| !is_missing(v))
    }

    /// Value of a column as a search key, or `None` when absent or missing.
    pub fn lookup_term(&self, column: &str) -> Option<LookupTerm> {
        self.get(column).and_then(|v| LookupTerm::new(v).ok())
    }

    /// Set a column, appending it when the row does not have it yet.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column.to_owned(), value)),
        }
    }

    /// Column names in row order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            let column: String = column.into();
            row.set(&column, value);
        }
        row
    }
}

/// An input table: header plus rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Read a tab-separated table with a header row.
///
/// Short rows are padded with empty cells. Rows longer than the header are rejected, since
/// their extra cells cannot be attributed to a column.
///
/// # Errors
///
/// Returns `EnrichError` if the file cannot be read, is not valid in the requested encoding,
/// is not a well-formed table, repeats a header name, or contains a row longer than the header.
pub fn read_table(path: &Path, encoding: InputEncoding) -> EnrichResult<Table> {
    let bytes = fs::read(path).map_err(|source| EnrichError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match encoding {
        InputEncoding::Utf8 => String::from_utf8(bytes).map_err(|_| EnrichError::InputEncoding {
            path: path.to_path_buf(),
        })?,
        InputEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    };

    parse_table(&text)
}

/// Parse tab-separated text with a header row.
pub fn parse_table(text: &str) -> EnrichResult<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(TABLE_DELIMITER)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(EnrichError::TableParse)?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    for (index, column) in columns.iter().enumerate() {
        if columns[..index].contains(column) {
            return Err(EnrichError::DuplicateColumn {
                column: column.clone(),
            });
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(EnrichError::TableParse)?;
        if record.len() > columns.len() {
            return Err(EnrichError::RaggedRow {
                row: index,
                found: record.len(),
                expected: columns.len(),
            });
        }
        let row: Row = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Ordered union of columns: `leading` first, then columns of `rows` in first-seen order.
pub fn column_union(leading: &[String], rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(leading.len());
    for column in leading
        .iter()
        .map(String::as_str)
        .chain(rows.iter().flat_map(Row::columns))
    {
        if !columns.iter().any(|c| c == column) {
            columns.push(column.to_owned());
        }
    }
    columns
}

/// Write rows as a tab-separated table.
///
/// Parent directories of `path` are created when missing.
///
/// # Errors
///
/// Returns `EnrichError` if the output directory cannot be created or the table cannot be
/// written.
pub fn write_table(path: &Path, leading: &[String], rows: &[Row]) -> EnrichResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(EnrichError::OutputDirCreation)?;
    }

    let columns = column_union(leading, rows);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(TABLE_DELIMITER)
        .from_path(path)
        .map_err(EnrichError::TableWrite)?;

    writer
        .write_record(&columns)
        .map_err(EnrichError::TableWrite)?;
    for row in rows {
        writer
            .write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))
            .map_err(EnrichError::TableWrite)?;
    }
    writer.flush().map_err(EnrichError::OutputFlush)?;

    Ok(())
}
