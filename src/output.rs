//! Result workbooks

use crate::error::Result;
use crate::ontology::OntologyId;
use crate::sheet::Table;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

/// Worksheet name used for all written workbooks
pub const OUTPUT_SHEET: &str = "Sheet1";

/// `{ids}-combined_ontology_annotations-{YYYYmmdd-HHMMSS}.xlsx`
pub fn output_filename(ids: &[OntologyId], timestamp: DateTime<Local>) -> String {
    let prefix = ids
        .iter()
        .map(OntologyId::as_str)
        .collect::<Vec<_>>()
        .join("_");
    format!(
        "{}-combined_ontology_annotations-{}.xlsx",
        prefix,
        timestamp.format("%Y%m%d-%H%M%S")
    )
}

/// Write `table` as a single-sheet workbook with a bold header row
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row, values) in table.rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the combined results into `output_dir`, returning the file path
pub fn write_results(
    table: &Table,
    ids: &[OntologyId],
    output_dir: &Path,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    let path = output_dir.join(output_filename(ids, timestamp));
    write_table(table, &path)?;
    Ok(path)
}
