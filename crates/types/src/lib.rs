//! Validated primitives shared by the drugchem crates.
//!
//! - [`LookupTerm`]: a trimmed, non-missing value taken from a table cell and used as a search key
//! - [`RecordKind`]: which PubChem record collection (compounds or substances) is queried
//! - [`ExternalId`]: a numeric CID or SID returned by a search
//! - [`is_missing`]: the missing-cell rule used by the resolver and the row merger

use std::fmt;
use std::str::FromStr;

/// Cell values treated as "no value" in addition to blank cells.
///
/// Input tables are frequently exported from dataframe tooling, which writes these markers
/// for null cells.
pub const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-nan", "-NaN", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA",
];

/// Returns `true` when a cell value carries no data.
///
/// A value is missing when it is blank after trimming or exactly matches one of
/// [`MISSING_MARKERS`].
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// Errors that can occur when creating validated lookup values.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// The cell was blank or held a missing marker
    #[error("lookup term is missing")]
    Missing,

    #[error("unknown record kind '{0}' (expected compound or substance)")]
    UnknownKind(String),

    #[error("invalid identifier '{0}'")]
    InvalidId(String),
}

/// A search key guaranteed to carry data.
///
/// The input is trimmed on construction. Blank values and missing markers are rejected, so a
/// `LookupTerm` can always be sent to the compound database as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupTerm(String);

impl LookupTerm {
    /// Creates a new `LookupTerm` from a cell value.
    ///
    /// # Errors
    ///
    /// Returns `TermError::Missing` if the value is blank or a missing marker.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TermError> {
        let input = input.as_ref();
        if is_missing(input) {
            return Err(TermError::Missing);
        }
        Ok(Self(input.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LookupTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// PubChem record collection.
///
/// Compounds are deduplicated chemical structures keyed by CID. Substances are depositor
/// records keyed by SID. Both expose the same section tree in the record view service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    #[default]
    Compound,
    Substance,
}

impl RecordKind {
    /// Path segment naming the collection (`compound` / `substance`).
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Compound => "compound",
            RecordKind::Substance => "substance",
        }
    }

    /// Path segment requesting an identifier list (`cids` / `sids`).
    pub fn id_list_segment(self) -> &'static str {
        match self {
            RecordKind::Compound => "cids",
            RecordKind::Substance => "sids",
        }
    }

    /// Short identifier label used in log lines (`CID` / `SID`).
    pub fn id_label(self) -> &'static str {
        match self {
            RecordKind::Compound => "CID",
            RecordKind::Substance => "SID",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compound" | "cid" => Ok(RecordKind::Compound),
            "substance" | "sid" => Ok(RecordKind::Substance),
            _ => Err(TermError::UnknownKind(s.trim().to_owned())),
        }
    }
}

/// Numeric PubChem identifier (CID or SID, depending on the [`RecordKind`] it came from).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ExternalId(u64);

impl ExternalId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExternalId {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ExternalId)
            .map_err(|_| TermError::InvalidId(s.trim().to_owned()))
    }
}
