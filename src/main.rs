use std::path::Path;

use drugchem_core::{
    EnrichConfig,
    config::{
        column_from_env_value, input_encoding_from_env_value, record_kind_from_env_value,
        requests_per_second_from_env_value,
    },
    constants::{DEFAULT_INPUT_PATH, DEFAULT_NAME_COLUMN, DEFAULT_OUTPUT_PATH, REGISTRY_COLUMN},
};
use drugchem_pubchem::{DEFAULT_REST_BASE_URL, PubChemClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for a drugchem enrichment run
///
/// Reads the input table, enriches every row from PubChem and writes the output table.
/// Rows that cannot be resolved are written unchanged; only setup failures stop the run.
///
/// # Environment Variables
/// - `DRUGCHEM_INPUT`: input table (default: "drug_input/drugs.tsv")
/// - `DRUGCHEM_OUTPUT`: output table (default: "drug_output/drugs_output.tsv")
/// - `DRUGCHEM_KIND`: `compound` or `substance` (default: compound)
/// - `DRUGCHEM_NAME_COLUMN`: name lookup column (default: "chemical_name")
/// - `DRUGCHEM_REGISTRY_COLUMN`: registry lookup column (default: "cas_no")
/// - `DRUGCHEM_REQUESTS_PER_SECOND`: request budget (default: 5)
/// - `DRUGCHEM_SKIP_IF_PRESENT`: pass rows through when this column is populated
/// - `DRUGCHEM_INPUT_ENCODING`: `utf-8` or `latin-1` (default: utf-8)
/// - `PUBCHEM_BASE_URL`: PUG REST base URL
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - an environment value is invalid or the input table does not exist, or
/// - the input cannot be read or the output cannot be written.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drugchem=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input = std::env::var("DRUGCHEM_INPUT").unwrap_or_else(|_| DEFAULT_INPUT_PATH.into());
    let output = std::env::var("DRUGCHEM_OUTPUT").unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.into());
    if !Path::new(&input).exists() {
        anyhow::bail!("Input table does not exist: {}", input);
    }

    let kind = record_kind_from_env_value(std::env::var("DRUGCHEM_KIND").ok())?;
    let requests_per_second =
        requests_per_second_from_env_value(std::env::var("DRUGCHEM_REQUESTS_PER_SECOND").ok())?;
    let encoding = input_encoding_from_env_value(std::env::var("DRUGCHEM_INPUT_ENCODING").ok())?;
    let name_column = column_from_env_value(std::env::var("DRUGCHEM_NAME_COLUMN").ok())
        .unwrap_or_else(|| DEFAULT_NAME_COLUMN.into());
    let registry_column = column_from_env_value(std::env::var("DRUGCHEM_REGISTRY_COLUMN").ok())
        .unwrap_or_else(|| REGISTRY_COLUMN.into());
    let skip_if_present = column_from_env_value(std::env::var("DRUGCHEM_SKIP_IF_PRESENT").ok());
    let base_url =
        std::env::var("PUBCHEM_BASE_URL").unwrap_or_else(|_| DEFAULT_REST_BASE_URL.into());

    let config = EnrichConfig::new(input, output)
        .with_kind(kind)
        .with_name_column(name_column)
        .with_registry_column(registry_column)
        .with_requests_per_second(requests_per_second)
        .with_skip_if_present(skip_if_present)
        .with_input_encoding(encoding);
    config.validate()?;

    tracing::info!(
        "++ Enriching {} -> {} ({} lookups at {} req/s)",
        config.input_path().display(),
        config.output_path().display(),
        config.kind(),
        config.requests_per_second()
    );

    let client = PubChemClient::with_base_url(&base_url)?;
    let summary = drugchem_core::run(&config, client)?;

    tracing::info!(
        "-- Done: {} rows, {} enriched, {} skipped, {} failed",
        summary.total,
        summary.enriched,
        summary.skipped,
        summary.failed
    );

    Ok(())
}
