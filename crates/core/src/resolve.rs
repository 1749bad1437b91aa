//! Identifier resolution.
//!
//! A row is resolved by trying an ordered list of lookup strategies, each naming the column
//! whose value is searched. The first strategy whose search yields a candidate wins. Absent
//! or missing cells skip their strategy; any search failure falls through to the next one.
//!
//! When a search returns several candidates the first one is used and the count is logged at
//! warn level.

use crate::constants::{DEFAULT_NAME_COLUMN, REGISTRY_COLUMN};
use crate::error::{EnrichError, EnrichResult};
use crate::table::Row;
use drugchem_pubchem::CompoundDatabase;
use drugchem_types::{ExternalId, LookupTerm, RecordKind};

/// One lookup strategy: search the value of `column`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupStrategy {
    /// Short label for log lines, e.g. `registry` or `name`.
    pub label: String,
    pub column: String,
}

impl LookupStrategy {
    pub fn new(label: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            column: column.into(),
        }
    }
}

/// A successful resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The selected identifier (first candidate).
    pub id: ExternalId,
    /// Label of the strategy that produced it.
    pub strategy: String,
    /// The term that was searched.
    pub term: LookupTerm,
    /// How many candidates the search returned.
    pub candidates: usize,
}

/// Resolves rows to identifiers through ordered strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolver {
    kind: RecordKind,
    strategies: Vec<LookupStrategy>,
}

impl Resolver {
    /// Resolver over an explicit strategy list.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::InvalidInput` if the list is empty or a column name is blank.
    pub fn new(kind: RecordKind, strategies: Vec<LookupStrategy>) -> EnrichResult<Self> {
        if strategies.is_empty() {
            return Err(EnrichError::InvalidInput(
                "at least one lookup strategy is required".into(),
            ));
        }
        if let Some(blank) = strategies.iter().find(|s| s.column.trim().is_empty()) {
            return Err(EnrichError::InvalidInput(format!(
                "lookup strategy '{}' has an empty column name",
                blank.label
            )));
        }
        Ok(Self { kind, strategies })
    }

    /// Registry number first, then the given name column.
    pub fn registry_then_name(
        kind: RecordKind,
        registry_column: &str,
        name_column: &str,
    ) -> EnrichResult<Self> {
        Self::new(
            kind,
            vec![
                LookupStrategy::new("registry", registry_column),
                LookupStrategy::new("name", name_column),
            ],
        )
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn strategies(&self) -> &[LookupStrategy] {
        &self.strategies
    }

    /// Resolve one row.
    ///
    /// # Arguments
    ///
    /// * `db` - Database to search.
    /// * `index` - Zero-based row index, for errors and log lines.
    /// * `row` - The row whose strategy columns are searched.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::MissingLookupKeys` if no strategy column holds a value, and
    /// `EnrichError::Unresolved` if every available term failed to match.
    pub fn resolve<D: CompoundDatabase>(
        &self,
        db: &D,
        index: usize,
        row: &Row,
    ) -> EnrichResult<Resolution> {
        let mut last_failure: Option<String> = None;

        for strategy in &self.strategies {
            let Some(term) = row.lookup_term(&strategy.column) else {
                tracing::debug!(
                    "row {}: no {} value in '{}', skipping",
                    index,
                    strategy.label,
                    strategy.column
                );
                continue;
            };

            match db.search(self.kind, &term) {
                Ok(candidates) => {
                    let Some(&id) = candidates.first() else {
                        tracing::warn!(
                            "row {}: no {} for {} '{}'",
                            index,
                            self.kind.id_label(),
                            strategy.label,
                            term
                        );
                        last_failure = Some(format!(
                            "no {} found for '{}'",
                            self.kind.id_label(),
                            term
                        ));
                        continue;
                    };
                    if candidates.len() > 1 {
                        tracing::warn!(
                            "row {}: {} {}s found for {} '{}', using the first: {}",
                            index,
                            candidates.len(),
                            self.kind.id_label(),
                            strategy.label,
                            term,
                            id
                        );
                    }
                    return Ok(Resolution {
                        id,
                        strategy: strategy.label.clone(),
                        term,
                        candidates: candidates.len(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "row {}: {} lookup for '{}' failed: {}",
                        index,
                        strategy.label,
                        term,
                        e
                    );
                    last_failure = Some(e.to_string());
                }
            }
        }

        match last_failure {
            Some(reason) => Err(EnrichError::Unresolved {
                row: index,
                kind: self.kind,
                reason,
            }),
            None => Err(EnrichError::MissingLookupKeys {
                row: index,
                columns: self
                    .strategies
                    .iter()
                    .map(|s| s.column.clone())
                    .collect(),
            }),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            kind: RecordKind::default(),
            strategies: vec![
                LookupStrategy::new("registry", REGISTRY_COLUMN),
                LookupStrategy::new("name", DEFAULT_NAME_COLUMN),
            ],
        }
    }
}
