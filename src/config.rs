//! Configuration for harmonica
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults
//! 2. Optional `harmonica.toml` in the working directory (or an explicit file)
//! 3. `HARMONICA_*` environment variables (e.g. `HARMONICA_CACHE_DIR`)

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "HARMONICA";

/// Host serving gzipped semantic-sql snapshots (`{id}.db.gz`)
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://s3.amazonaws.com/bbop-sqlite";

/// Resolved configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarmonicaConfig {
    /// Directory holding cached `{id}.db` snapshots
    pub cache_dir: PathBuf,

    /// Base URL of the remote snapshot host
    pub remote_base_url: String,

    /// Directory that relative input filenames are resolved against
    pub input_dir: PathBuf,

    /// Directory results are written to
    pub output_dir: PathBuf,

    /// Worksheet read from input workbooks
    pub sheet_name: String,

    /// Header of the column holding the terms to search
    pub search_column: String,

    /// Snapshots older than this are reported stale even without a remote date
    pub max_cache_age_days: u64,

    /// Timeout applied to every HTTP request
    pub http_timeout_secs: u64,

    /// Chat model used by `extract`
    pub llm_model: String,

    /// OpenAI-compatible API base URL used by `extract`
    pub llm_base_url: String,
}

/// Default snapshot cache directory, shared with other semantic-sql tooling
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".data")
        .join("oaklib")
}

impl HarmonicaConfig {
    /// Load configuration from `harmonica.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Load configuration from an explicit file plus the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("cache_dir", default_cache_dir().to_string_lossy().to_string())?
            .set_default("remote_base_url", DEFAULT_REMOTE_BASE_URL)?
            .set_default("input_dir", "data/input")?
            .set_default("output_dir", "data/output")?
            .set_default("sheet_name", "Sheet1")?
            .set_default("search_column", "source_column_value")?
            .set_default("max_cache_age_days", 30_i64)?
            .set_default("http_timeout_secs", 300_i64)?
            .set_default("llm_model", "gpt-3.5-turbo")?
            .set_default("llm_base_url", "https://api.openai.com/v1")?;

        let builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("harmonica").required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: HarmonicaConfig = settings.try_deserialize()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
