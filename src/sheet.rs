//! Spreadsheet input
//!
//! Workbooks are read into a [`Table`] of strings: one header row followed by
//! data rows, all padded to the header width.

use crate::error::{HarmonicaError, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::NaiveTime;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Column holding the per-row identifier
pub const UUID_COLUMN: &str = "UUID";

/// In-memory sheet of string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending an empty column when it does not exist
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }
}

/// Render a cell the way it reads in the spreadsheet
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read one worksheet of an `.xlsx` workbook
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<Table> {
    info!("Reading sheet '{}' from {}", sheet_name, path.display());

    if !path.exists() {
        return Err(HarmonicaError::Spreadsheet(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        return Err(HarmonicaError::Spreadsheet(format!(
            "sheet '{}' not found in {} (available: {})",
            sheet_name,
            path.display(),
            sheet_names.join(", ")
        )));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        table.push_row(values);
    }

    debug!(
        "Read {} rows x {} columns from '{}'",
        table.len(),
        table.headers.len(),
        sheet_name
    );
    Ok(table)
}

/// Make sure every row has a `UUID`; existing identifiers are kept
pub fn ensure_uuid_column(table: &mut Table) -> usize {
    let index = table.ensure_column(UUID_COLUMN);
    let mut generated = 0;
    for row in &mut table.rows {
        if row[index].trim().is_empty() {
            row[index] = Uuid::new_v4().to_string();
            generated += 1;
        }
    }
    debug!("Generated {} row identifiers", generated);
    index
}
