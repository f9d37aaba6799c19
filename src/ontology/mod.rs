//! Ontology identifiers, search configuration and snapshot access
//!
//! Snapshots use the semantic-sql layout: one SQLite file per ontology with a
//! `statements` triple table. `store` reads them, `cache` manages the local
//! copies and their freshness, `remote` downloads new ones.

pub mod cache;
pub mod remote;
pub mod store;
#[doc(hidden)]
pub mod test_utils;

use crate::error::{HarmonicaError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use cache::{CacheEntry, Freshness, OntologyCache};
pub use remote::{RemoteInfo, RemoteSource};
pub use store::OntologyStore;

static ONTOLOGY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid ontology id pattern"));

/// Lowercase OBO ontology identifier (`hp`, `mondo`, `maxo`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OntologyId(String);

impl OntologyId {
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_lowercase();
        if !ONTOLOGY_ID_PATTERN.is_match(&id) {
            return Err(HarmonicaError::InvalidOntologyId(id));
        }
        Ok(Self(id))
    }

    /// Parse a comma-separated list such as `"mondo, hp"`, skipping empty pieces
    pub fn parse_list(ids: &str) -> Result<Vec<Self>> {
        let mut parsed: Vec<Self> = Vec::new();
        for piece in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id = Self::new(piece)?;
            if !parsed.contains(&id) {
                parsed.push(id);
            }
        }
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Column prefix used in spreadsheets; HP columns are historically `hpo*`
    pub fn prefix(&self) -> &str {
        if self.0 == "hp" {
            "hpo"
        } else {
            &self.0
        }
    }

    /// CURIE prefix of terms native to this ontology (`HP:`, `MONDO:`)
    pub fn curie_prefix(&self) -> String {
        format!("{}:", self.0.to_uppercase())
    }

    pub fn label_column(&self) -> String {
        format!("{}Label", self.prefix())
    }

    pub fn code_column(&self) -> String {
        format!("{}Code", self.prefix())
    }

    pub fn match_type_column(&self) -> String {
        format!("{}_result_match_type", self.prefix())
    }
}

impl FromStr for OntologyId {
    type Err = HarmonicaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for OntologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which term properties a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchProperty {
    /// `rdfs:label` only
    Label,
    /// Label plus every oio synonym predicate
    Alias,
}

impl SearchProperty {
    pub fn predicates(&self) -> &'static [&'static str] {
        match self {
            SearchProperty::Label => &["rdfs:label"],
            SearchProperty::Alias => &[
                "rdfs:label",
                "oio:hasExactSynonym",
                "oio:hasBroadSynonym",
                "oio:hasNarrowSynonym",
                "oio:hasRelatedSynonym",
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProperty::Label => "LABEL",
            SearchProperty::Alias => "ALIAS",
        }
    }

    /// Match type recorded in the results, e.g. `HPO_EXACT_LABEL`
    pub fn match_type(&self, ontology: &OntologyId) -> String {
        format!("{}_EXACT_{}", ontology.prefix().to_uppercase(), self.as_str())
    }
}

/// Exact-match search settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfiguration {
    pub properties: Vec<SearchProperty>,
    pub force_case_insensitive: bool,
}

impl SearchConfiguration {
    pub fn exact_label() -> Self {
        Self {
            properties: vec![SearchProperty::Label],
            force_case_insensitive: true,
        }
    }

    pub fn exact_alias() -> Self {
        Self {
            properties: vec![SearchProperty::Alias],
            force_case_insensitive: true,
        }
    }

    /// Distinct predicates covered by all configured properties
    pub fn predicates(&self) -> Vec<&'static str> {
        let mut predicates: Vec<&'static str> = Vec::new();
        for property in &self.properties {
            for predicate in property.predicates() {
                if !predicates.contains(predicate) {
                    predicates.push(predicate);
                }
            }
        }
        predicates
    }

    /// Property that names the match type of results from this search
    pub fn primary_property(&self) -> SearchProperty {
        self.properties.first().copied().unwrap_or(SearchProperty::Label)
    }
}

/// Term lookup against one ontology
///
/// Implemented by [`OntologyStore`]; annotation code depends only on this.
pub trait OntologySearch {
    /// CURIEs of terms whose configured properties equal `term`
    fn basic_search(&self, term: &str, config: &SearchConfiguration) -> Result<Vec<String>>;

    /// Label of a term, if it has one
    fn label(&self, curie: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_mapping() {
        let hp = OntologyId::new("HP").unwrap();
        assert_eq!(hp.as_str(), "hp");
        assert_eq!(hp.prefix(), "hpo");
        assert_eq!(hp.curie_prefix(), "HP:");
        assert_eq!(hp.label_column(), "hpoLabel");
        assert_eq!(hp.match_type_column(), "hpo_result_match_type");

        let mondo = OntologyId::new("mondo").unwrap();
        assert_eq!(mondo.prefix(), "mondo");
        assert_eq!(mondo.code_column(), "mondoCode");
        assert_eq!(mondo.curie_prefix(), "MONDO:");
    }

    #[test]
    fn test_parse_list() {
        let ids = OntologyId::parse_list(" mondo, hp,,MAXO ,hp").unwrap();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["mondo", "hp", "maxo"]);

        assert!(OntologyId::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_ids_rejected() {
        assert!(OntologyId::new("../etc").is_err());
        assert!(OntologyId::new("hp mondo").is_err());
        assert!(OntologyId::new("").is_err());
        assert!(matches!(
            OntologyId::parse_list("mondo,h/p"),
            Err(HarmonicaError::InvalidOntologyId(_))
        ));
    }

    #[test]
    fn test_match_types() {
        let hp = OntologyId::new("hp").unwrap();
        assert_eq!(SearchProperty::Label.match_type(&hp), "HPO_EXACT_LABEL");
        assert_eq!(SearchProperty::Alias.match_type(&hp), "HPO_EXACT_ALIAS");
    }

    #[test]
    fn test_alias_covers_label() {
        let config = SearchConfiguration::exact_alias();
        let predicates = config.predicates();
        assert!(predicates.contains(&"rdfs:label"));
        assert!(predicates.contains(&"oio:hasExactSynonym"));
        assert_eq!(SearchConfiguration::exact_label().predicates(), vec!["rdfs:label"]);
    }
}
