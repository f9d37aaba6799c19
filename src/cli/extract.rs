//! Extract command: LLM-assisted term pre-processing

use harmonica_core::extract::{LlmConfig, TermExtractor};
use harmonica_core::{icons, output, sheet, HarmonicaConfig, Result};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Handle extract command
pub async fn handle(
    input: &Path,
    output_path: &Path,
    sheet_name: Option<&str>,
    config: &HarmonicaConfig,
) -> Result<()> {
    debug!("Running extract command...");

    let extractor = TermExtractor::new(LlmConfig::from_config(config))?;
    let table = sheet::read_sheet(input, sheet_name.unwrap_or(&config.sheet_name))?;
    println!("Extracting terms from {} rows...", table.len());

    let extracted = extractor.process_table(&table).await?;
    output::write_table(&extracted, output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "{} Results saved to {} ({} terms)",
        icons::action::save(),
        output_path.display(),
        extracted.len()
    );
    Ok(())
}
