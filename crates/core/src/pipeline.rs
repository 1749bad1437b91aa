//! Row enrichment pipeline.
//!
//! Rows are processed strictly in input order, one at a time: resolve an identifier, fetch its
//! record, extract fields, merge them into the row. A row that fails at any step is carried
//! through to the output unchanged and the run continues.

use crate::config::EnrichConfig;
use crate::error::EnrichResult;
use crate::extract::{extract_fields, ExtractedFields};
use crate::merge::{merge_fields, MergeOutcome};
use crate::resolve::{Resolution, Resolver};
use crate::table::{read_table, write_table, Row};
use crate::throttle::{RateLimiter, Throttled};
use drugchem_pubchem::{CompoundDatabase, PubChemError};
use drugchem_types::{ExternalId, LookupTerm, RecordKind};

/// What happened to a single row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row was resolved, fetched and merged.
    Enriched {
        resolution: Resolution,
        merge: MergeOutcome,
    },
    /// The skip column was already populated; no requests were made.
    Skipped,
    /// Resolution or fetching failed; the row is unchanged.
    Failed { reason: String },
}

/// Counts for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub enriched: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Enriched { .. } => self.enriched += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Drives rows through resolution, fetching, extraction and merging.
#[derive(Debug)]
pub struct Enricher<D> {
    db: D,
    resolver: Resolver,
    skip_if_present: Option<String>,
}

impl<D: CompoundDatabase> Enricher<D> {
    pub fn new(db: D, resolver: Resolver) -> Self {
        Self {
            db,
            resolver,
            skip_if_present: None,
        }
    }

    /// Pass rows through untouched when `column` is already populated.
    pub fn with_skip_if_present(mut self, column: Option<String>) -> Self {
        self.skip_if_present = column;
        self
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    /// Resolve, fetch and extract for one row without modifying it.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error, or `EnrichError::PubChem` if the record fetch fails.
    pub fn fetch_fields(
        &self,
        index: usize,
        row: &Row,
    ) -> EnrichResult<(Resolution, ExtractedFields)> {
        let resolution = self.resolver.resolve(&self.db, index, row)?;
        let kind = self.resolver.kind();
        let record = self.db.fetch(kind, resolution.id)?;
        let fields = extract_fields(&record, kind, resolution.id);
        Ok((resolution, fields))
    }

    /// Enrich one row in place.
    ///
    /// The row is only modified once its fields have been extracted, so a failure leaves it
    /// exactly as it was.
    pub fn enrich_row(&self, index: usize, row: &mut Row) -> RowOutcome {
        if let Some(column) = self.skip_if_present.as_deref() {
            if row.is_populated(column) {
                tracing::debug!("row {}: '{}' already populated, skipping", index, column);
                return RowOutcome::Skipped;
            }
        }

        match self.fetch_fields(index, row) {
            Ok((resolution, fields)) => {
                let merge = merge_fields(row, &fields);
                tracing::info!(
                    "row {}: {} {} via {} '{}' ({} filled, {} kept)",
                    index,
                    self.resolver.kind().id_label(),
                    resolution.id,
                    resolution.strategy,
                    resolution.term,
                    merge.filled,
                    merge.kept
                );
                RowOutcome::Enriched { resolution, merge }
            }
            Err(e) => {
                tracing::error!("row {}: {}", index, e);
                RowOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Enrich every row in order.
    pub fn enrich_rows(&self, rows: &mut [Row]) -> RunSummary {
        let mut summary = RunSummary::default();
        for (index, row) in rows.iter_mut().enumerate() {
            let outcome = self.enrich_row(index, row);
            summary.record(&outcome);
        }
        summary
    }
}

/// Look up a single term and extract its fields.
///
/// Uses the first candidate the search returns.
///
/// # Errors
///
/// Returns `EnrichError::PubChem` if the search finds nothing or either request fails.
pub fn lookup_term<D: CompoundDatabase>(
    db: &D,
    kind: RecordKind,
    term: &LookupTerm,
) -> EnrichResult<(ExternalId, ExtractedFields)> {
    let candidates = db.search(kind, term)?;
    let id = *candidates.first().ok_or_else(|| PubChemError::NotFound {
        kind,
        term: term.to_string(),
    })?;
    if candidates.len() > 1 {
        tracing::warn!(
            "{} {}s found for '{}', using the first: {}",
            candidates.len(),
            kind.id_label(),
            term,
            id
        );
    }
    let record = db.fetch(kind, id)?;
    Ok((id, extract_fields(&record, kind, id)))
}

/// Run a complete enrichment: read the input table, enrich each row, write the output table.
///
/// Requests to `db` are paced to the configured budget. The output is written once, after
/// every row has been processed; per-row failures are counted in the summary, not returned.
///
/// # Errors
///
/// Returns `EnrichError` if the configuration is invalid or the input cannot be read or the
/// output cannot be written.
pub fn run<D: CompoundDatabase>(config: &EnrichConfig, db: D) -> EnrichResult<RunSummary> {
    config.validate()?;
    let resolver = config.resolver()?;

    let mut table = read_table(config.input_path(), config.input_encoding())?;
    tracing::info!(
        "read {} rows from {}",
        table.rows.len(),
        config.input_path().display()
    );

    if !table
        .columns
        .iter()
        .any(|c| c == config.registry_column() || c == config.name_column())
    {
        tracing::warn!(
            "input has neither '{}' nor '{}'; no row can be resolved",
            config.registry_column(),
            config.name_column()
        );
    }

    let throttled = Throttled::new(db, RateLimiter::per_second(config.requests_per_second()));
    let enricher = Enricher::new(throttled, resolver)
        .with_skip_if_present(config.skip_if_present().map(str::to_owned));
    let summary = enricher.enrich_rows(&mut table.rows);

    write_table(config.output_path(), &table.columns, &table.rows)?;
    tracing::info!(
        "wrote {} rows to {}",
        table.rows.len(),
        config.output_path().display()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::resolve::tests::FakeDatabase;
    use crate::table::{parse_table, InputEncoding};
    use drugchem_pubchem::Record;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn aspirin_record() -> Record {
        serde_json::from_value(json!({
            "RecordType": "CID",
            "RecordNumber": 2244,
            "RecordTitle": "Aspirin",
            "Section": [
                {
                    "TOCHeading": "Names and Identifiers",
                    "Section": [{
                        "TOCHeading": "Other Identifiers",
                        "Section": [
                            {"TOCHeading": "CAS", "Information": [{"Value": {"StringWithMarkup": [{"String": "50-78-2"}]}}]},
                            {"TOCHeading": "UNII", "Information": [{"Value": {"StringWithMarkup": [{"String": "R16CO5Y76E"}]}}]}
                        ]
                    }]
                },
                {
                    "TOCHeading": "Drug and Medication Information",
                    "Section": [{
                        "TOCHeading": "Drug Indication",
                        "Information": [{"Value": {"StringWithMarkup": [{"String": "Pain relief."}]}}]
                    }]
                }
            ]
        }))
        .unwrap()
    }

    fn aspirin_db() -> FakeDatabase {
        FakeDatabase::default()
            .with_search("50-78-2", &[2244])
            .with_search("aspirin", &[2244])
            .with_record(2244, aspirin_record())
    }

    fn rows(text: &str) -> Vec<Row> {
        parse_table(text).unwrap().rows
    }

    #[test]
    fn test_enriches_row_by_name() {
        let enricher = Enricher::new(aspirin_db(), Resolver::default());
        let mut rows = rows("cas_no\tchemical_name\n\taspirin\n");

        let summary = enricher.enrich_rows(&mut rows);

        assert_eq!(
            summary,
            RunSummary {
                total: 1,
                enriched: 1,
                skipped: 0,
                failed: 0
            }
        );
        let row = &rows[0];
        assert_eq!(row.get("cas_no"), Some("50-78-2"));
        assert_eq!(row.get("generic_name"), Some("Aspirin"));
        assert_eq!(row.get("unii_no"), Some("R16CO5Y76E"));
        assert_eq!(row.get("indication"), Some("Pain relief."));
        assert_eq!(
            row.get("url"),
            Some("https://pubchem.ncbi.nlm.nih.gov/compound/2244")
        );
        assert_eq!(
            enricher.database().calls(),
            vec!["search:aspirin", "fetch:2244"]
        );
    }

    #[test]
    fn test_unresolvable_row_is_unchanged() {
        let enricher = Enricher::new(aspirin_db(), Resolver::default());
        let mut rows = rows("cas_no\tchemical_name\n\tunknownxyz123\n");
        let before = rows.clone();

        let summary = enricher.enrich_rows(&mut rows);

        assert_eq!(summary.failed, 1);
        assert_eq!(rows, before);
        assert_eq!(enricher.database().calls(), vec!["search:unknownxyz123"]);
    }

    #[test]
    fn test_row_without_lookup_values_makes_no_requests() {
        let enricher = Enricher::new(aspirin_db(), Resolver::default());
        let mut row: Row = [("cas_no", "NA"), ("chemical_name", "")].into_iter().collect();
        let before = row.clone();

        let outcome = enricher.enrich_row(0, &mut row);

        assert!(matches!(outcome, RowOutcome::Failed { .. }));
        assert_eq!(row, before);
        assert!(enricher.database().calls().is_empty());
    }

    #[test]
    fn test_fetch_failure_leaves_row_unchanged() {
        let db = FakeDatabase::default().with_search("aspirin", &[2244]);
        let enricher = Enricher::new(db, Resolver::default());
        let mut row: Row = [("chemical_name", "aspirin")].into_iter().collect();
        let before = row.clone();

        let outcome = enricher.enrich_row(0, &mut row);

        match outcome {
            RowOutcome::Failed { reason } => assert!(reason.contains("404")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(row, before);
    }

    #[test]
    fn test_rerun_on_enriched_rows_changes_nothing() {
        let enricher = Enricher::new(aspirin_db(), Resolver::default());
        let mut rows = rows("cas_no\tchemical_name\n\taspirin\n");
        enricher.enrich_rows(&mut rows);
        let once = rows.clone();

        enricher.enrich_rows(&mut rows);

        assert_eq!(rows, once);
    }

    #[test]
    fn test_skip_column_bypasses_lookup() {
        let enricher = Enricher::new(aspirin_db(), Resolver::default())
            .with_skip_if_present(Some("url".into()));
        let mut rows = rows(
            "cas_no\tchemical_name\turl\n\
             \taspirin\thttps://example.org/x\n\
             \taspirin\t\n",
        );

        let summary = enricher.enrich_rows(&mut rows);

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.enriched, 1);
        assert_eq!(rows[0].get("generic_name"), None);
        assert_eq!(rows[1].get("generic_name"), Some("Aspirin"));
        assert_eq!(
            enricher.database().calls(),
            vec!["search:aspirin", "fetch:2244"]
        );
    }

    #[test]
    fn test_lookup_term_uses_first_candidate() {
        let db = FakeDatabase::default()
            .with_search("aspirin", &[2244, 1])
            .with_record(2244, aspirin_record());
        let term = LookupTerm::new("aspirin").unwrap();

        let (id, fields) = lookup_term(&db, RecordKind::Compound, &term).unwrap();

        assert_eq!(id, ExternalId::new(2244));
        assert_eq!(fields.get("generic_name"), Some("Aspirin"));

        let err = lookup_term(&db, RecordKind::Compound, &LookupTerm::new("x").unwrap())
            .unwrap_err();
        assert!(matches!(err, EnrichError::PubChem(ref e) if e.is_not_found()));
    }

    #[test]
    fn test_run_writes_all_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("drugs.tsv");
        let output = dir.path().join("out").join("drugs_output.tsv");
        fs::write(
            &input,
            "cas_no\tchemical_name\tnote\n\
             \tunknownxyz123\tfirst\n\
             50-78-2\taspirin\tsecond\n\
             \t\tthird\n",
        )
        .unwrap();

        let config = EnrichConfig::new(&input, &output).with_requests_per_second(1000.0);
        let summary = run(&config, aspirin_db()).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                total: 3,
                enriched: 1,
                skipped: 0,
                failed: 2
            }
        );

        let written = crate::table::read_table(&output, InputEncoding::Utf8).unwrap();
        assert_eq!(
            written.columns,
            vec![
                "cas_no",
                "chemical_name",
                "note",
                "generic_name",
                "url",
                "unii_no",
                "indication"
            ]
        );
        let notes: Vec<&str> = written
            .rows
            .iter()
            .map(|r| r.get("note").unwrap())
            .collect();
        assert_eq!(notes, vec!["first", "second", "third"]);
        assert_eq!(written.rows[0].get("generic_name"), Some(""));
        assert_eq!(written.rows[1].get("generic_name"), Some("Aspirin"));
        assert_eq!(written.rows[1].get("cas_no"), Some("50-78-2"));
    }

    #[test]
    fn test_run_rejects_invalid_config_before_reading() {
        let dir = TempDir::new().unwrap();
        let config = EnrichConfig::new(dir.path().join("missing.tsv"), dir.path().join("o.tsv"))
            .with_requests_per_second(0.0);
        let err = run(&config, FakeDatabase::default()).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidInput(_)));
    }

    #[test]
    fn test_run_rejects_vanishing_rate_without_panicking() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("drugs.tsv");
        fs::write(&input, "cas_no\tchemical_name\n\taspirin\n").unwrap();
        let config = EnrichConfig::new(&input, dir.path().join("o.tsv"))
            .with_requests_per_second(1e-20);

        let err = run(&config, aspirin_db()).unwrap_err();

        assert!(matches!(err, EnrichError::InvalidInput(_)));
        assert!(!dir.path().join("o.tsv").exists());
    }

    #[test]
    fn test_run_rejects_repeated_headers_without_writing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("drugs.tsv");
        let output = dir.path().join("o.tsv");
        fs::write(&input, "note\tcas_no\tnote\nfirst\t50-78-2\tsecond\n").unwrap();

        let err = run(&EnrichConfig::new(&input, &output), aspirin_db()).unwrap_err();

        assert!(matches!(err, EnrichError::DuplicateColumn { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_reports_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = EnrichConfig::new(dir.path().join("missing.tsv"), dir.path().join("o.tsv"));
        let err = run(&config, FakeDatabase::default()).unwrap_err();
        assert!(matches!(err, EnrichError::InputRead { .. }));
    }
}
