use drugchem_pubchem::PubChemError;
use drugchem_types::{RecordKind, TermError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid value: {0}")]
    Term(#[from] TermError),

    #[error("failed to read input table {path}: {source}", path = .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input table {path} is not valid UTF-8 (try Latin-1 decoding)", path = .path.display())]
    InputEncoding { path: PathBuf },
    #[error("failed to parse input table: {0}")]
    TableParse(csv::Error),
    #[error("input table repeats the column '{column}'")]
    DuplicateColumn { column: String },
    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("failed to create output directory: {0}")]
    OutputDirCreation(std::io::Error),
    #[error("failed to write output table: {0}")]
    TableWrite(csv::Error),
    #[error("failed to flush output table: {0}")]
    OutputFlush(std::io::Error),

    #[error("row {row}: no lookup value in any of {columns:?}")]
    MissingLookupKeys { row: usize, columns: Vec<String> },
    #[error("row {row}: could not resolve a {} ({reason})", .kind.id_label())]
    Unresolved {
        row: usize,
        kind: RecordKind,
        reason: String,
    },
    #[error("PubChem request failed: {0}")]
    PubChem(#[from] PubChemError),
}

pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
