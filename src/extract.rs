//! LLM-assisted term extraction
//!
//! Pre-processing step for free-text source values: an OpenAI-compatible chat
//! model splits each value into disease, phenotype and medical process terms,
//! producing one row per term ready for `search`.

use crate::config::HarmonicaConfig;
use crate::error::{HarmonicaError, Result};
use crate::sheet::{Table, UUID_COLUMN};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};

/// Columns every extraction input row must carry
pub const INPUT_COLUMNS: &[&str] = &[UUID_COLUMN, "study", "source_column", "source_column_value"];

/// Configuration for the extraction model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key (from OPENAI_API_KEY)
    pub api_key: String,

    /// Chat model name
    pub model: String,

    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
}

impl LlmConfig {
    pub fn from_config(config: &HarmonicaConfig) -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: config.llm_model.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Terms found in one source value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedTerms {
    #[serde(default)]
    pub disease: Vec<String>,
    #[serde(default)]
    pub phenotype: Vec<String>,
    #[serde(default)]
    pub medical_process: Vec<String>,
}

impl ExtractedTerms {
    /// `(category, term)` pairs in a stable order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let disease = self.disease.iter().map(|t| ("disease", t.as_str()));
        let phenotype = self.phenotype.iter().map(|t| ("phenotype", t.as_str()));
        let process = self
            .medical_process
            .iter()
            .map(|t| ("medical_process", t.as_str()));
        disease.chain(phenotype).chain(process)
    }

    pub fn is_empty(&self) -> bool {
        self.disease.is_empty() && self.phenotype.is_empty() && self.medical_process.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for the extraction model
pub struct TermExtractor {
    config: LlmConfig,
    client: reqwest::Client,
}

impl TermExtractor {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(HarmonicaError::LlmApi("OPENAI_API_KEY not set".to_string()));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    fn prompt(text: &str) -> String {
        format!(
            r#"Identify and categorize any terms in the following text related to diseases, phenotypes, or medical processes.
Return a JSON object with keys 'disease', 'phenotype', and 'medical_process' and include the identified terms under each.

Text: {}"#,
            text
        )
    }

    /// Ask the model which terms `text` contains
    pub async fn extract_terms(&self, text: &str) -> Result<ExtractedTerms> {
        debug!("Extracting terms from: {}", text);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::prompt(text),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(HarmonicaError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| HarmonicaError::LlmApi(format!("Failed to parse response: {}", e)))?;

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| HarmonicaError::LlmApi("Empty response from API".to_string()))?;

        parse_terms(content)
    }

    /// One output row per extracted term; rows whose request fails yield nothing
    pub async fn process_table(&self, table: &Table) -> Result<Table> {
        let indices = INPUT_COLUMNS
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| HarmonicaError::ColumnNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let value_index = indices[3];

        let mut headers: Vec<String> = INPUT_COLUMNS.iter().map(|s| s.to_string()).collect();
        headers.push("category".to_string());
        headers.push("term".to_string());
        let mut output = Table::new(headers);

        for (i, row) in table.rows.iter().enumerate() {
            let value = &row[value_index];
            let terms = match self.extract_terms(value).await {
                Ok(terms) => terms,
                Err(e) => {
                    warn!("Error processing text '{}': {}", value, e);
                    ExtractedTerms::default()
                }
            };
            info!(
                "{}: {} - extracted {:?}",
                row[indices[0]], value, terms
            );

            for (category, term) in terms.iter() {
                let mut out: Vec<String> = indices.iter().map(|&idx| row[idx].clone()).collect();
                out.push(category.to_string());
                out.push(term.to_string());
                output.push_row(out);
            }
            eprint!("\rExtracting terms: {}/{} ", i + 1, table.len());
        }
        if !table.is_empty() {
            eprintln!();
        }

        Ok(output)
    }
}

/// Parse the model's JSON answer, tolerating Markdown code fences
pub fn parse_terms(content: &str) -> Result<ExtractedTerms> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let mut terms: ExtractedTerms = serde_json::from_str(body)?;
    for list in [&mut terms.disease, &mut terms.phenotype, &mut terms.medical_process] {
        list.iter_mut().for_each(|t| *t = t.trim().to_string());
        list.retain(|t| !t.is_empty());
    }
    Ok(terms)
}
