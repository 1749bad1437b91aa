//! Constants used throughout the drugchem core crate.
//!
//! Column names, defaults and delimiters live here so the resolver, extractor and table I/O
//! agree on them.

/// Column holding the CAS registry number; first lookup strategy.
pub const REGISTRY_COLUMN: &str = "cas_no";

/// Default column holding the chemical name; second lookup strategy.
pub const DEFAULT_NAME_COLUMN: &str = "chemical_name";

/// Default PubChem request budget (requests per second).
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 5.0;

/// Delimiter of input and output tables.
pub const TABLE_DELIMITER: u8 = b'\t';

/// Default input table path when none is configured.
pub const DEFAULT_INPUT_PATH: &str = "drug_input/drugs.tsv";

/// Default output table path when none is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "drug_output/drugs_output.tsv";

/// Separator between GHS hazard statements in the `hazard_statements` column.
pub const HAZARD_STATEMENT_SEPARATOR: &str = "; ";
