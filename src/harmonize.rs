//! Term annotation
//!
//! Every row's search term is matched against each ontology, first on exact
//! labels and then, for rows still unmatched, on labels plus synonyms. The
//! per-ontology tables are finally merged back into one row per input record.

use crate::error::{HarmonicaError, Result};
use crate::ontology::{OntologyId, OntologySearch, SearchConfiguration};
use crate::sheet::{Table, UUID_COLUMN};
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, info, warn};

/// Columns identifying one input record in the combined output
pub const KEY_COLUMNS: &[&str] = &[
    UUID_COLUMN,
    "study",
    "source_column",
    "source_column_value",
    "conditionMeasureSourceText",
];

/// Annotation columns carried into the combined output when present
pub const ANNOTATION_COLUMNS: &[&str] = &[
    "hpoLabel",
    "hpoCode",
    "hpo_result_match_type",
    "mondoLabel",
    "mondoCode",
    "mondo_result_match_type",
    "maxoLabel",
    "maxoCode",
    "maxo_result_match_type",
    "otherLabel",
    "otherCode",
];

/// Separator for multiple values in one cell
pub const VALUE_SEPARATOR: &str = ", ";

/// Terms matched for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    pub curies: Vec<String>,
    pub labels: Vec<String>,
    pub match_type: String,
}

/// Counts reported after annotating against one ontology
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    pub rows: usize,
    pub label_matches: usize,
    pub alias_matches: usize,
}

impl AnnotationStats {
    pub fn unmatched(&self) -> usize {
        self.rows - self.label_matches - self.alias_matches
    }
}

/// Locate the column holding search terms
///
/// Falls back to the third column when `name` is absent, which is where the
/// term sits in the standard extraction layout. Row identifiers are never
/// searched.
pub fn resolve_search_column(table: &Table, name: &str) -> Result<usize> {
    if let Some(index) = table.column_index(name) {
        return Ok(index);
    }
    if table.headers.len() >= 3 && table.headers[2] != UUID_COLUMN {
        warn!(
            "Column '{}' not found, searching column '{}' instead",
            name, table.headers[2]
        );
        return Ok(2);
    }
    Err(HarmonicaError::ColumnNotFound(name.to_string()))
}

/// Search one term, keeping only CURIEs native to `ontology`
pub fn search_term<S: OntologySearch>(
    search: &S,
    ontology: &OntologyId,
    term: &str,
    config: &SearchConfiguration,
) -> Result<Option<TermMatch>> {
    let prefix = ontology.curie_prefix();
    let curies: Vec<String> = search
        .basic_search(term, config)?
        .into_iter()
        .filter(|curie| curie.starts_with(&prefix))
        .collect();

    if curies.is_empty() {
        return Ok(None);
    }

    let labels = curies
        .iter()
        .map(|curie| search.label(curie).map(Option::unwrap_or_default))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TermMatch {
        curies,
        labels,
        match_type: config.primary_property().match_type(ontology),
    }))
}

/// Annotate every row of `table` against one ontology
///
/// Adds `{prefix}Label`, `{prefix}Code` and `{prefix}_result_match_type`.
/// Rows without a match keep whatever those columns already held.
pub fn annotate<S: OntologySearch>(
    table: &Table,
    ontology: &OntologyId,
    search: &S,
    search_column: usize,
) -> Result<(Table, AnnotationStats)> {
    let label_config = SearchConfiguration::exact_label();
    let alias_config = SearchConfiguration::exact_alias();

    let mut annotated = table.clone();
    let label_index = annotated.ensure_column(&ontology.label_column());
    let code_index = annotated.ensure_column(&ontology.code_column());
    let match_type_index = annotated.ensure_column(&ontology.match_type_column());

    let mut stats = AnnotationStats {
        rows: table.len(),
        ..Default::default()
    };

    for (i, row) in table.rows.iter().enumerate() {
        let term = row.get(search_column).map(String::as_str).unwrap_or_default();

        let found = match search_term(search, ontology, term, &label_config)? {
            Some(found) => {
                stats.label_matches += 1;
                Some(found)
            }
            None => {
                let found = search_term(search, ontology, term, &alias_config)?;
                if found.is_some() {
                    stats.alias_matches += 1;
                }
                found
            }
        };

        if let Some(found) = found {
            debug!("{} matched {:?} ({})", term, found.curies, found.match_type);
            let out = &mut annotated.rows[i];
            out[label_index] = found.labels.join(VALUE_SEPARATOR);
            out[code_index] = found.curies.join(VALUE_SEPARATOR);
            out[match_type_index] = found.match_type;
        }

        eprint!("\rProcessing rows [{}]: {}/{} ", ontology, i + 1, stats.rows);
        let _ = std::io::stderr().flush();
    }
    if stats.rows > 0 {
        eprintln!();
    }

    info!(
        "{}: {} rows, {} label matches, {} alias matches, {} unmatched",
        ontology,
        stats.rows,
        stats.label_matches,
        stats.alias_matches,
        stats.unmatched()
    );
    Ok((annotated, stats))
}

/// Curator note columns (`Notes`, `Reviewer notes`) travel with the annotations
fn is_note_column(header: &str) -> bool {
    header.trim().to_lowercase().ends_with("notes")
}

/// Merge per-ontology tables into one row per input record
///
/// Rows are grouped on the key columns (plus the search column) and each
/// annotation column joins its distinct non-empty values. Groups keep the
/// order in which they first appear.
pub fn combine(results: &[(OntologyId, Table)], search_column: &str) -> Table {
    let has_column = |name: &str| results.iter().any(|(_, t)| t.column_index(name).is_some());

    let mut key_columns: Vec<String> = KEY_COLUMNS
        .iter()
        .filter(|&&name| has_column(name))
        .map(|name| name.to_string())
        .collect();
    if !key_columns.iter().any(|c| c == search_column) && has_column(search_column) {
        key_columns.push(search_column.to_string());
    }

    let mut value_columns: Vec<String> = ANNOTATION_COLUMNS
        .iter()
        .filter(|&&name| has_column(name))
        .map(|name| name.to_string())
        .collect();
    for (_, table) in results {
        for header in table.headers.iter().filter(|h| is_note_column(h)) {
            if !value_columns.contains(header) && !key_columns.contains(header) {
                value_columns.push(header.clone());
            }
        }
    }
    for (ontology, _) in results {
        for column in [
            ontology.label_column(),
            ontology.code_column(),
            ontology.match_type_column(),
        ] {
            if !value_columns.contains(&column) {
                value_columns.push(column);
            }
        }
    }

    let mut groups: Vec<(Vec<String>, Vec<Vec<String>>)> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for (_, table) in results {
        let key_indices: Vec<Option<usize>> =
            key_columns.iter().map(|c| table.column_index(c)).collect();
        let value_indices: Vec<Option<usize>> =
            value_columns.iter().map(|c| table.column_index(c)).collect();

        for row in &table.rows {
            let key: Vec<String> = key_indices
                .iter()
                .map(|i| i.map(|i| row[i].clone()).unwrap_or_default())
                .collect();

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push((key, vec![Vec::new(); value_columns.len()]));
                groups.len() - 1
            });

            for (values, column) in groups[slot].1.iter_mut().zip(&value_indices) {
                if let Some(value) = column.map(|i| row[i].trim()) {
                    if !value.is_empty() && !values.iter().any(|v| v == value) {
                        values.push(value.to_string());
                    }
                }
            }
        }
    }

    let mut headers = key_columns;
    headers.extend(value_columns);
    let mut combined = Table::new(headers);
    for (mut key, values) in groups {
        key.extend(values.into_iter().map(|v| v.join(VALUE_SEPARATOR)));
        combined.push_row(key);
    }

    debug!("Combined {} records", combined.len());
    combined
}
