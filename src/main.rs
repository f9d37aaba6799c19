//! Harmonica - ontology harmonization for spreadsheet terms
//!
//! Command-line entry point: annotates spreadsheet terms with ontology
//! identifiers and manages the local cache of ontology snapshots.

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use harmonica_core::{HarmonicaConfig, Result};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harmonica")]
#[command(about = "Harmonize spreadsheet terms to ontology identifiers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to ./harmonica.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search ontologies for matches to the terms in a spreadsheet
    Search {
        /// Ontology IDs separated by commas (e.g. mondo,hp)
        #[arg(short, long)]
        oid: String,

        /// Input workbook, looked up in the input directory unless it is a path
        #[arg(short, long = "data-filename", alias = "data_filename")]
        data_filename: String,

        /// Worksheet to read (default from config: Sheet1)
        #[arg(long)]
        sheet: Option<String>,

        /// Column holding the terms (default from config: source_column_value)
        #[arg(long)]
        column: Option<String>,

        /// Continue with cached versions without prompting
        #[arg(short, long)]
        yes: bool,

        /// Download fresh snapshots without prompting
        #[arg(long, conflicts_with = "yes")]
        refresh: bool,

        /// Output directory (default from config: data/output)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show cached ontology versions and whether they are stale
    Versions {
        /// Ontology IDs separated by commas
        #[arg(short, long)]
        oid: String,

        /// Skip the remote check and judge by cache age only
        #[arg(long)]
        offline: bool,
    },

    /// Download ontology snapshots without annotating
    Fetch {
        /// Ontology IDs separated by commas
        #[arg(short, long)]
        oid: String,

        /// Replace snapshots that are already cached
        #[arg(long)]
        refresh: bool,
    },

    /// Remove cached ontology snapshots
    ClearCache {
        /// Ontology IDs separated by commas
        #[arg(short, long)]
        oid: String,
    },

    /// Extract disease, phenotype and process terms from free text with an LLM
    Extract {
        /// Input workbook with UUID, study, source_column, source_column_value
        #[arg(short, long)]
        input: PathBuf,

        /// Output workbook
        #[arg(short = 'O', long, default_value = "output.xlsx")]
        output: PathBuf,

        /// Worksheet to read
        #[arg(long)]
        sheet: Option<String>,
    },
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Library and binary share the level; dependencies stay at warn
    let level = log_level(cli.verbose, cli.quiet).as_str().to_lowercase();
    let filter = EnvFilter::new(format!(
        "warn,harmonica={},harmonica_core={}",
        level, level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Harmonica v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => HarmonicaConfig::load_from(path)?,
        None => HarmonicaConfig::load()?,
    };

    match cli.command {
        Commands::Search {
            oid,
            data_filename,
            sheet,
            column,
            yes,
            refresh,
            output_dir,
        } => {
            let args = cli::search::SearchArgs {
                oid,
                data_filename,
                sheet,
                column,
                yes,
                refresh,
                output_dir,
            };
            cli::search::handle(args, &config).await
        }
        Commands::Versions { oid, offline } => cli::versions::handle(&oid, offline, &config).await,
        Commands::Fetch { oid, refresh } => cli::cache::handle_fetch(&oid, refresh, &config).await,
        Commands::ClearCache { oid } => cli::cache::handle_clear(&oid, &config),
        Commands::Extract {
            input,
            output,
            sheet,
        } => cli::extract::handle(&input, &output, sheet.as_deref(), &config).await,
    }
}
