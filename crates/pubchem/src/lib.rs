//! PubChem wire/boundary support for drugchem.
//!
//! This crate provides the **wire models** and **transport** for the two read-only PubChem
//! operations the enrichment pipeline consumes:
//! - identifier search by name or registry string (PUG REST)
//! - full record fetch by identifier (PUG View)
//!
//! The pipeline only talks to the [`CompoundDatabase`] trait, so any service offering the same
//! search/fetch semantics can stand in for PubChem (tests use an in-memory implementation).

pub mod client;
pub mod record;
pub mod search;

pub use client::PubChemClient;
pub use record::{Information, InformationValue, Record, Section, StringWithMarkup};
pub use search::interpret_search;

use drugchem_types::{ExternalId, LookupTerm, RecordKind};

/// Default PUG REST base URL. Search and record-view paths are appended to it.
pub const DEFAULT_REST_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest";

/// Base URL of the human-facing record pages.
pub const WEB_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov";

/// Fault code PubChem returns when a search matches nothing.
pub const NOT_FOUND_FAULT_CODE: &str = "PUGREST.NotFound";

/// Link to the web page of a record, e.g. `https://pubchem.ncbi.nlm.nih.gov/compound/2244`.
pub fn record_page_url(kind: RecordKind, id: ExternalId) -> String {
    format!("{WEB_BASE_URL}/{}/{id}", kind.as_str())
}

/// Errors returned by the `pubchem` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum PubChemError {
    #[error("no {} found for '{term}'", .kind.id_label())]
    NotFound { kind: RecordKind, term: String },

    #[error("PubChem fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response schema mismatch at {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

impl PubChemError {
    /// `true` when the service answered but had no match for the search term.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PubChemError::NotFound { .. })
    }
}

/// Type alias for Results that can fail with a [`PubChemError`].
pub type PubChemResult<T> = Result<T, PubChemError>;

/// The two operations the enrichment pipeline needs from a compound database.
///
/// Implementations are synchronous: each call blocks until the service answers or fails.
pub trait CompoundDatabase {
    /// Search identifiers by a name or registry string.
    ///
    /// # Errors
    ///
    /// Returns [`PubChemError::NotFound`] when the service has no match. Implementations may
    /// return an empty list instead; callers treat both the same way.
    fn search(&self, kind: RecordKind, term: &LookupTerm) -> PubChemResult<Vec<ExternalId>>;

    /// Fetch the full record tree for an identifier.
    fn fetch(&self, kind: RecordKind, id: ExternalId) -> PubChemResult<Record>;
}

impl<D: CompoundDatabase + ?Sized> CompoundDatabase for &D {
    fn search(&self, kind: RecordKind, term: &LookupTerm) -> PubChemResult<Vec<ExternalId>> {
        (**self).search(kind, term)
    }

    fn fetch(&self, kind: RecordKind, id: ExternalId) -> PubChemResult<Record> {
        (**self).fetch(kind, id)
    }
}

/// Decode a JSON body with `serde_path_to_error`, reporting the failing path.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(body: &str) -> PubChemResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PubChemError::Decode {
            path,
            message: err.into_inner().to_string(),
        }
    })
}
