//! Error types for harmonica
//!
//! A single thiserror enum covers every failure surface (cache, network,
//! spreadsheets, configuration). anyhow only adds context in CLI handlers.

use thiserror::Error;

/// Main error type for harmonica operations
#[derive(Error, Debug)]
pub enum HarmonicaError {
    /// Ontology snapshot could not be queried
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Ontology identifier failed validation
    #[error("Invalid ontology id: {0}")]
    InvalidOntologyId(String),

    /// Cached snapshot is missing or unusable
    #[error("Cache error: {0}")]
    Cache(String),

    /// Remote snapshot host returned an error or could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Input workbook could not be read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Output workbook could not be written
    #[error("Workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// Requested column does not exist in the input sheet
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Term extraction request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for harmonica operations
pub type Result<T> = std::result::Result<T, HarmonicaError>;

impl From<calamine::XlsxError> for HarmonicaError {
    fn from(err: calamine::XlsxError) -> Self {
        HarmonicaError::Spreadsheet(err.to_string())
    }
}

/// Convert anyhow::Error to HarmonicaError, keeping the context chain
impl From<anyhow::Error> for HarmonicaError {
    fn from(err: anyhow::Error) -> Self {
        HarmonicaError::Other(format!("{:#}", err))
    }
}
