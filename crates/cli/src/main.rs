use clap::{Parser, Subcommand};
use drugchem_core::{
    constants::{DEFAULT_NAME_COLUMN, DEFAULT_REQUESTS_PER_SECOND, REGISTRY_COLUMN},
    extract::{NAME_FIELD, URL_FIELD},
    lookup_term, run, EnrichConfig, InputEncoding, Pick, FIELD_RULES,
};
use drugchem_pubchem::{PubChemClient, DEFAULT_REST_BASE_URL};
use drugchem_types::{LookupTerm, RecordKind};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "drugchem")]
#[command(about = "Enrich drug tables with PubChem metadata")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich every row of a tab-separated table
    Enrich {
        /// Input table
        #[arg(long)]
        input: PathBuf,
        /// Output table (parent directories are created)
        #[arg(long)]
        output: PathBuf,
        /// Record collection: compound or substance
        #[arg(long, default_value = "compound")]
        kind: RecordKind,
        /// Column searched when the registry number does not resolve
        #[arg(long, default_value = DEFAULT_NAME_COLUMN)]
        name_column: String,
        /// Column holding the CAS registry number
        #[arg(long, default_value = REGISTRY_COLUMN)]
        registry_column: String,
        /// Request budget against PubChem
        #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_SECOND)]
        requests_per_second: f64,
        /// Pass rows through untouched when this column is populated
        #[arg(long)]
        skip_if_present: Option<String>,
        /// Decode the input as Latin-1 instead of UTF-8
        #[arg(long)]
        latin1: bool,
        /// PUG REST base URL
        #[arg(long, default_value = DEFAULT_REST_BASE_URL)]
        base_url: String,
    },
    /// Look up one name or registry number and print its fields
    Lookup {
        /// Name or registry number
        term: String,
        /// Record collection: compound or substance
        #[arg(long, default_value = "compound")]
        kind: RecordKind,
        /// PUG REST base URL
        #[arg(long, default_value = DEFAULT_REST_BASE_URL)]
        base_url: String,
    },
    /// Print the field extraction table
    Fields,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drugchem=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Enrich {
            input,
            output,
            kind,
            name_column,
            registry_column,
            requests_per_second,
            skip_if_present,
            latin1,
            base_url,
        }) => {
            let encoding = if latin1 {
                InputEncoding::Latin1
            } else {
                InputEncoding::Utf8
            };
            let config = EnrichConfig::new(input, output)
                .with_kind(kind)
                .with_name_column(name_column)
                .with_registry_column(registry_column)
                .with_requests_per_second(requests_per_second)
                .with_skip_if_present(skip_if_present)
                .with_input_encoding(encoding);
            config.validate()?;

            let client = PubChemClient::with_base_url(&base_url)?;
            let summary = run(&config, client)?;
            println!(
                "Processed {} rows: {} enriched, {} skipped, {} failed",
                summary.total, summary.enriched, summary.skipped, summary.failed
            );
            println!("Output written to {}", config.output_path().display());
        }
        Some(Commands::Lookup {
            term,
            kind,
            base_url,
        }) => {
            let term = LookupTerm::new(&term)?;
            let client = PubChemClient::with_base_url(&base_url)?;
            let (id, fields) = lookup_term(&client, kind, &term)?;
            println!("{}: {}", kind.id_label(), id);
            for (field, value) in fields.iter() {
                println!("{}: {}", field, value);
            }
        }
        Some(Commands::Fields) => {
            println!("{}\t(record title)\ttitle", NAME_FIELD);
            println!("{}\t(record page)\tlink", URL_FIELD);
            for rule in FIELD_RULES {
                let pick = match rule.pick {
                    Pick::FirstString => "first string".to_string(),
                    Pick::FirstEntryName => "first entry name".to_string(),
                    Pick::JoinNamed { name, separator } => {
                        format!("all '{}' strings joined by {:?}", name, separator)
                    }
                };
                println!("{}\t{}\t{}", rule.field, rule.path.join(" > "), pick);
            }
        }
        None => {
            println!("Use 'drugchem --help' for commands");
        }
    }

    Ok(())
}
