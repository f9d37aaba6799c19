//! Search command: reconcile the cache, annotate, write results

use harmonica_core::{
    harmonize, icons, output, reconcile, sheet, Decision, HarmonicaConfig, OntologyCache,
    RemoteSource, Result, StdinPrompter,
};
use anyhow::Context;
use std::path::PathBuf;
use tracing::{debug, info};

use super::helpers::{parse_ontology_ids, resolve_input_path};

/// Arguments of `harmonica search`
pub struct SearchArgs {
    pub oid: String,
    pub data_filename: String,
    pub sheet: Option<String>,
    pub column: Option<String>,
    pub yes: bool,
    pub refresh: bool,
    pub output_dir: Option<PathBuf>,
}

/// Handle search command
pub async fn handle(args: SearchArgs, config: &HarmonicaConfig) -> Result<()> {
    debug!("Running search command...");

    let ids = parse_ontology_ids(&args.oid)?;
    let input_path = resolve_input_path(config, &args.data_filename);
    let sheet_name = args.sheet.as_deref().unwrap_or(&config.sheet_name);
    let column_name = args.column.as_deref().unwrap_or(&config.search_column);

    let mut table = sheet::read_sheet(&input_path, sheet_name)
        .with_context(|| format!("Failed to load terms from {}", input_path.display()))?;
    info!("Number of total rows in sheet: {}", table.len());
    // Resolve before UUID is appended so the fallback sees the input layout
    let search_column = harmonize::resolve_search_column(&table, column_name)?;
    let search_column_name = table.headers[search_column].clone();
    sheet::ensure_uuid_column(&mut table);

    let cache = OntologyCache::new(config);
    let remote = RemoteSource::new(config)?;

    let decision = if args.refresh {
        Decision::Refresh
    } else if args.yes {
        let statuses = reconcile::collect_statuses(&ids, &cache, Some(&remote)).await?;
        reconcile::display_statuses(&statuses, &mut std::io::stdout())?;
        Decision::UseCached
    } else {
        reconcile::reconcile(&ids, &cache, Some(&remote), &mut StdinPrompter, &mut std::io::stdout())
            .await?
    };

    if decision == Decision::Abort {
        return Ok(());
    }

    let results = reconcile::annotate_all(
        &table,
        search_column,
        &ids,
        &cache,
        &remote,
        decision,
        &mut std::io::stdout(),
    )
    .await?;

    let combined = harmonize::combine(&results, &search_column_name);
    let output_dir = args.output_dir.as_ref().unwrap_or(&config.output_dir);
    let path = output::write_results(&combined, &ids, output_dir, chrono::Local::now())?;

    println!(
        "{} Results saved to {}",
        icons::action::save(),
        path.display()
    );
    Ok(())
}
