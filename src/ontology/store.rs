//! Read-only access to a cached ontology snapshot
//!
//! Snapshots follow the semantic-sql layout, where every assertion is a row of
//! `statements(stanza, subject, predicate, object, value, datatype, language, graph)`.
//! Literal values (labels, synonyms) live in `value`; IRIs/CURIEs in `object`.

use crate::error::{HarmonicaError, Result};
use crate::ontology::{OntologySearch, SearchConfiguration};
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Connection to one snapshot file
pub struct OntologyStore {
    conn: Connection,
    path: PathBuf,
}

impl OntologyStore {
    /// Open a snapshot read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(HarmonicaError::Cache(format!(
                "snapshot not found: {}",
                path.display()
            )));
        }

        debug!("Opening ontology snapshot: {}", path.display());
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let store = Self { conn, path };
        store.validate()?;
        info!("Opened ontology snapshot: {}", store.path.display());
        Ok(store)
    }

    /// Fail unless the file looks like a semantic-sql snapshot
    fn validate(&self) -> Result<()> {
        let has_statements: bool = self
            .conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master
                 WHERE name = 'statements' AND type IN ('table', 'view')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| {
                HarmonicaError::Cache(format!("{} is not a SQLite database: {}", self.path.display(), e))
            })?;

        if !has_statements {
            return Err(HarmonicaError::Cache(format!(
                "{} has no statements table",
                self.path.display()
            )));
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subjects declared as `owl:Ontology`
    pub fn ontologies(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT subject FROM statements
             WHERE predicate = 'rdf:type' AND object = 'owl:Ontology'
             ORDER BY subject",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Predicate to value map for an ontology header (`owl:versionIRI`, `dcterms:title`, ...)
    ///
    /// When a predicate repeats, the first value in sort order wins.
    pub fn ontology_metadata(&self, ontology: &str) -> Result<BTreeMap<String, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT predicate, COALESCE(object, value) FROM statements
             WHERE subject = ?1 AND COALESCE(object, value) IS NOT NULL
             ORDER BY predicate, COALESCE(object, value)",
        )?;
        let rows = stmt.query_map([ontology], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut metadata = BTreeMap::new();
        for row in rows {
            let (predicate, value) = row?;
            metadata.entry(predicate).or_insert(value);
        }
        Ok(metadata)
    }

    /// `owl:versionIRI` of the first declared ontology
    pub fn version_iri(&self) -> Result<Option<String>> {
        for ontology in self.ontologies()? {
            if let Some(version) = self.ontology_metadata(&ontology)?.remove("owl:versionIRI") {
                return Ok(Some(version));
            }
        }
        Ok(None)
    }

    /// Number of distinct labelled terms, excluding blank nodes; shown by `versions`
    pub fn term_count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT subject) FROM statements
             WHERE predicate = 'rdfs:label' AND subject NOT LIKE '\\_:%' ESCAPE '\\'",
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

impl OntologySearch for OntologyStore {
    fn basic_search(&self, term: &str, config: &SearchConfiguration) -> Result<Vec<String>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let predicates = config.predicates();
        let placeholders = (0..predicates.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let comparison = if config.force_case_insensitive {
            "value = ?1 COLLATE NOCASE"
        } else {
            "value = ?1"
        };

        // Blank nodes (`_:...`) carry axiom annotations, not terms
        let sql = format!(
            "SELECT DISTINCT subject FROM statements
             WHERE {} AND predicate IN ({}) AND subject NOT LIKE '\\_:%' ESCAPE '\\'
             ORDER BY subject",
            comparison, placeholders
        );

        let mut params: Vec<&str> = Vec::with_capacity(predicates.len() + 1);
        params.push(term);
        params.extend(predicates.iter().copied());

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn label(&self, curie: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT value FROM statements
             WHERE subject = ?1 AND predicate = 'rdfs:label' AND value IS NOT NULL
             ORDER BY value LIMIT 1",
        )?;
        Ok(stmt.query_row([curie], |row| row.get(0)).optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::test_utils::{create_fixture_snapshot, FixtureTerm};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, OntologyStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hp.db");
        create_fixture_snapshot(
            &path,
            "hp",
            Some("http://purl.obolibrary.org/obo/hp/releases/2024-04-26/hp.owl"),
            &[
                FixtureTerm::new("HP:0001250", "Seizure").synonym("oio:hasExactSynonym", "Seizures"),
                FixtureTerm::new("HP:0001263", "Global developmental delay")
                    .synonym("oio:hasRelatedSynonym", "Developmental delay"),
                FixtureTerm::new("MONDO:0005027", "Epilepsy"),
            ],
        )
        .unwrap();
        let store = OntologyStore::open(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let result = OntologyStore::open(dir.path().join("nope.db"));
        assert!(matches!(result, Err(HarmonicaError::Cache(_))));
    }

    #[test]
    fn test_open_rejects_non_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path)
            .unwrap()
            .execute("CREATE TABLE unrelated (x TEXT)", [])
            .unwrap();

        assert!(matches!(OntologyStore::open(&path), Err(HarmonicaError::Cache(_))));
    }

    #[test]
    fn test_version_metadata() {
        let (_dir, store) = fixture();
        assert_eq!(store.ontologies().unwrap(), vec!["obo:hp.owl".to_string()]);
        assert_eq!(
            store.version_iri().unwrap().as_deref(),
            Some("http://purl.obolibrary.org/obo/hp/releases/2024-04-26/hp.owl")
        );
        // The fixture's `_:b0` axiom label is not a term
        assert_eq!(store.term_count().unwrap(), 3);
    }

    #[test]
    fn test_label_search_is_case_insensitive() {
        let (_dir, store) = fixture();
        let results = store
            .basic_search("seizure", &SearchConfiguration::exact_label())
            .unwrap();
        assert_eq!(results, vec!["HP:0001250".to_string()]);

        // Synonyms are not labels
        let results = store
            .basic_search("Seizures", &SearchConfiguration::exact_label())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_case_sensitive_search() {
        let (_dir, store) = fixture();
        let config = SearchConfiguration {
            force_case_insensitive: false,
            ..SearchConfiguration::exact_label()
        };
        assert!(store.basic_search("seizure", &config).unwrap().is_empty());
        assert_eq!(store.basic_search("Seizure", &config).unwrap().len(), 1);
    }

    #[test]
    fn test_alias_search_covers_synonyms_and_labels() {
        let (_dir, store) = fixture();
        let alias = SearchConfiguration::exact_alias();
        assert_eq!(
            store.basic_search("developmental delay", &alias).unwrap(),
            vec!["HP:0001263".to_string()]
        );
        assert_eq!(
            store.basic_search("Seizure", &alias).unwrap(),
            vec!["HP:0001250".to_string()]
        );
    }

    #[test]
    fn test_blank_terms_and_labels() {
        let (_dir, store) = fixture();
        assert!(store
            .basic_search("   ", &SearchConfiguration::exact_label())
            .unwrap()
            .is_empty());
        assert_eq!(
            store.label("HP:0001250").unwrap().as_deref(),
            Some("Seizure")
        );
        assert_eq!(store.label("HP:9999999").unwrap(), None);
    }
}
