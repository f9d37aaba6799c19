//! Harmonica - ontology harmonization for spreadsheet terms
//!
//! Maps free-text terms (disease names, phenotypes, procedures) found in
//! spreadsheet rows to canonical ontology identifiers such as MONDO or HP
//! CURIEs, using locally cached semantic-sql snapshots of each ontology.
//!
//! # Architecture
//!
//! - **Ontology**: identifiers, snapshot store, local cache and remote host
//! - **Reconcile**: cache freshness display and the refresh decision
//! - **Sheet / Output**: workbook input and result workbooks
//! - **Harmonize**: label and synonym matching, result merging
//! - **Extract**: optional LLM pre-processing of free-text values
//!
//! # Example
//!
//! ```ignore
//! use harmonica_core::{harmonize, HarmonicaConfig, OntologyCache, OntologyId, RemoteSource};
//!
//! #[tokio::main]
//! async fn main() -> harmonica_core::Result<()> {
//!     let config = HarmonicaConfig::load()?;
//!     let cache = OntologyCache::new(&config);
//!     let remote = RemoteSource::new(&config)?;
//!
//!     let mondo = OntologyId::new("mondo")?;
//!     let store = cache.ensure(&mondo, false, &remote).await?;
//!
//!     let table = harmonica_core::sheet::read_sheet("terms.xlsx".as_ref(), "Sheet1")?;
//!     let (annotated, stats) = harmonize::annotate(&table, &mondo, &store, 2)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod harmonize;
pub mod icons;
pub mod ontology;
pub mod output;
pub mod reconcile;
pub mod sheet;

// Re-export commonly used types
pub use config::HarmonicaConfig;
pub use error::{HarmonicaError, Result};
pub use ontology::{
    CacheEntry, Freshness, OntologyCache, OntologyId, OntologySearch, OntologyStore, RemoteInfo,
    RemoteSource, SearchConfiguration, SearchProperty,
};
pub use reconcile::{Decision, Prompter, StdinPrompter};
pub use sheet::Table;
