//! Shared helper functions for CLI commands

use harmonica_core::{HarmonicaConfig, HarmonicaError, OntologyId, Result};
use std::path::{Path, PathBuf};

/// Parse `--oid`, requiring at least one ontology
pub fn parse_ontology_ids(oid: &str) -> Result<Vec<OntologyId>> {
    let ids = OntologyId::parse_list(oid)?;
    if ids.is_empty() {
        return Err(HarmonicaError::InvalidOntologyId(
            "no ontology ids given (e.g. --oid mondo,hp)".to_string(),
        ));
    }
    Ok(ids)
}

/// Resolve an input file: existing paths are used as-is, bare names are
/// looked up in the configured input directory
pub fn resolve_input_path(config: &HarmonicaConfig, name: &str) -> PathBuf {
    let direct = Path::new(name);
    if direct.exists() || direct.is_absolute() {
        direct.to_path_buf()
    } else {
        config.input_dir.join(name)
    }
}
