//! # drugchem core
//!
//! Enrichment logic for drug tables:
//! - Identifier resolution with ordered fallback (registry number, then name)
//! - Field extraction from record trees via a declarative rule table
//! - Gap-filling row merges that never overwrite existing values
//! - A sequential, rate-limited pipeline from input table to output table
//!
//! **No transport concerns**: HTTP and the PubChem wire format live in `drugchem-pubchem`;
//! this crate only talks to the [`drugchem_pubchem::CompoundDatabase`] trait.

pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod resolve;
pub mod table;
pub mod throttle;

pub use config::EnrichConfig;
pub use error::{EnrichError, EnrichResult};
pub use extract::{extract_fields, ExtractedFields, FieldRule, Pick, FIELD_RULES};
pub use merge::{merge_fields, MergeOutcome};
pub use pipeline::{lookup_term, run, Enricher, RowOutcome, RunSummary};
pub use resolve::{LookupStrategy, Resolution, Resolver};
pub use table::{InputEncoding, Row, Table};
pub use throttle::{RateLimiter, Throttled};
