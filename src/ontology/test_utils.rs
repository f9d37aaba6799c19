//! Fixture snapshots for tests
//!
//! Builds tiny databases in the semantic-sql layout so search and cache code
//! can be exercised without downloading real ontologies.

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

const STATEMENTS_SCHEMA: &str = "
CREATE TABLE statements (
    stanza TEXT,
    subject TEXT,
    predicate TEXT,
    object TEXT,
    value TEXT,
    datatype TEXT,
    language TEXT,
    graph TEXT
);
";

/// A term with its label and synonyms
#[derive(Debug, Clone)]
pub struct FixtureTerm {
    pub curie: String,
    pub label: String,
    pub synonyms: Vec<(String, String)>,
}

impl FixtureTerm {
    pub fn new(curie: &str, label: &str) -> Self {
        Self {
            curie: curie.to_string(),
            label: label.to_string(),
            synonyms: Vec::new(),
        }
    }

    pub fn synonym(mut self, predicate: &str, value: &str) -> Self {
        self.synonyms.push((predicate.to_string(), value.to_string()));
        self
    }
}

/// Write a snapshot for `ontology` containing `terms`
pub fn create_fixture_snapshot(
    path: &Path,
    ontology: &str,
    version_iri: Option<&str>,
    terms: &[FixtureTerm],
) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(STATEMENTS_SCHEMA)?;

    let header = format!("obo:{}.owl", ontology);
    insert(&conn, &header, "rdf:type", Some("owl:Ontology"), None)?;
    if let Some(version) = version_iri {
        insert(&conn, &header, "owl:versionIRI", Some(version), None)?;
    }

    for term in terms {
        insert(&conn, &term.curie, "rdf:type", Some("owl:Class"), None)?;
        insert(&conn, &term.curie, "rdfs:label", None, Some(&term.label))?;
        for (predicate, value) in &term.synonyms {
            insert(&conn, &term.curie, predicate, None, Some(value))?;
        }
    }

    // Axiom annotations hang off blank nodes and must never surface as hits
    if let Some(term) = terms.first() {
        insert(&conn, "_:b0", "rdfs:label", None, Some(&term.label))?;
    }

    Ok(())
}

fn insert(
    conn: &Connection,
    subject: &str,
    predicate: &str,
    object: Option<&str>,
    value: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO statements (stanza, subject, predicate, object, value) VALUES (?1, ?1, ?2, ?3, ?4)",
        params![subject, predicate, object, value],
    )?;
    Ok(())
}
