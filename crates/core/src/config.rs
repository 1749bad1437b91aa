//! Enrichment run configuration.
//!
//! Configuration is resolved once at process startup and passed into the pipeline. The
//! pipeline never reads environment variables or module-level paths itself, so a run is fully
//! described by its [`EnrichConfig`].

use crate::constants::{DEFAULT_NAME_COLUMN, DEFAULT_REQUESTS_PER_SECOND, REGISTRY_COLUMN};
use crate::resolve::Resolver;
use crate::table::InputEncoding;
use crate::throttle::interval_for_rate;
use crate::{EnrichError, EnrichResult};
use drugchem_types::RecordKind;
use std::path::{Path, PathBuf};

/// Configuration for one enrichment run.
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichConfig {
    input_path: PathBuf,
    output_path: PathBuf,
    kind: RecordKind,
    registry_column: String,
    name_column: String,
    requests_per_second: f64,
    skip_if_present: Option<String>,
    input_encoding: InputEncoding,
}

impl EnrichConfig {
    /// Create a configuration with default lookup columns, compound records and the default
    /// request budget.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            kind: RecordKind::default(),
            registry_column: REGISTRY_COLUMN.into(),
            name_column: DEFAULT_NAME_COLUMN.into(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            skip_if_present: None,
            input_encoding: InputEncoding::default(),
        }
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_registry_column(mut self, column: impl Into<String>) -> Self {
        self.registry_column = column.into();
        self
    }

    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = column.into();
        self
    }

    pub fn with_requests_per_second(mut self, requests_per_second: f64) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    /// Rows with a populated value in `column` are passed through without any lookup.
    pub fn with_skip_if_present(mut self, column: Option<String>) -> Self {
        self.skip_if_present = column;
        self
    }

    pub fn with_input_encoding(mut self, encoding: InputEncoding) -> Self {
        self.input_encoding = encoding;
        self
    }

    /// Check the configuration before a run starts.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::InvalidInput` if:
    /// - the input and output paths are the same,
    /// - a lookup column or the skip column is blank,
    /// - the request budget is not a finite number greater than zero, or is so small that the
    ///   spacing between requests cannot be represented.
    pub fn validate(&self) -> EnrichResult<()> {
        if self.input_path == self.output_path {
            return Err(EnrichError::InvalidInput(format!(
                "output path must differ from input path ({})",
                self.input_path.display()
            )));
        }
        if self.registry_column.trim().is_empty() || self.name_column.trim().is_empty() {
            return Err(EnrichError::InvalidInput(
                "lookup column names cannot be empty".into(),
            ));
        }
        if self
            .skip_if_present
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(EnrichError::InvalidInput(
                "skip column name cannot be empty".into(),
            ));
        }
        if interval_for_rate(self.requests_per_second).is_none() {
            return Err(EnrichError::InvalidInput(format!(
                "requests per second out of range, got {}",
                self.requests_per_second
            )));
        }
        Ok(())
    }

    /// Resolver for this configuration: registry column first, then the name column.
    pub fn resolver(&self) -> EnrichResult<Resolver> {
        Resolver::registry_then_name(self.kind, &self.registry_column, &self.name_column)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn registry_column(&self) -> &str {
        &self.registry_column
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    pub fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    pub fn skip_if_present(&self) -> Option<&str> {
        self.skip_if_present.as_deref()
    }

    pub fn input_encoding(&self) -> InputEncoding {
        self.input_encoding
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the record kind from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns compound records.
pub fn record_kind_from_env_value(value: Option<String>) -> EnrichResult<RecordKind> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<RecordKind>())
        .transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Parse the request budget from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_REQUESTS_PER_SECOND`].
pub fn requests_per_second_from_env_value(value: Option<String>) -> EnrichResult<f64> {
    match non_blank(value) {
        None => Ok(DEFAULT_REQUESTS_PER_SECOND),
        Some(v) => v.parse::<f64>().map_err(|_| {
            EnrichError::InvalidInput(format!("requests per second is not a number: {v}"))
        }),
    }
}

/// Parse the input encoding from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns UTF-8.
pub fn input_encoding_from_env_value(value: Option<String>) -> EnrichResult<InputEncoding> {
    non_blank(value)
        .map(|v| v.parse::<InputEncoding>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse an optional column name; blank values mean "not set".
pub fn column_from_env_value(value: Option<String>) -> Option<String> {
    non_blank(value)
}
