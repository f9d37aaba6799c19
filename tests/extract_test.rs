//! Term extraction against a local chat-completions endpoint

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use harmonica_core::extract::{LlmConfig, TermExtractor};
use harmonica_core::Table;
use serde_json::{json, Value};

async fn start_fake_llm() -> String {
    async fn complete(Json(request): Json<Value>) -> Result<Json<Value>, StatusCode> {
        let prompt = request["messages"][0]["content"].as_str().unwrap_or_default();
        let content = if prompt.contains("febrile seizures") {
            "```json\n{\"disease\": [\"febrile seizures\"], \"phenotype\": [\"developmental delay\"], \"medical_process\": []}\n```"
        } else if prompt.contains("explode") {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        } else {
            "{\"disease\": [], \"phenotype\": [], \"medical_process\": [\"MRI\"]}"
        };
        Ok(Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
    }

    let app = Router::new().route("/v1/chat/completions", post(complete));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn extractor(base_url: String) -> TermExtractor {
    TermExtractor::new(LlmConfig {
        api_key: "test-key".to_string(),
        model: "gpt-3.5-turbo".to_string(),
        base_url,
    })
    .unwrap()
}

#[tokio::test]
async fn test_extract_terms_from_fenced_answer() {
    let extractor = extractor(start_fake_llm().await);
    let terms = extractor
        .extract_terms("History of febrile seizures and developmental delay")
        .await
        .unwrap();
    assert_eq!(terms.disease, vec!["febrile seizures"]);
    assert_eq!(terms.phenotype, vec!["developmental delay"]);
    assert!(terms.medical_process.is_empty());
}

#[tokio::test]
async fn test_process_table_emits_one_row_per_term() {
    let extractor = extractor(start_fake_llm().await);

    let mut table = Table::new(
        ["UUID", "study", "source_column", "source_column_value", "notes"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    table.push_row(
        ["u1", "s1", "history", "febrile seizures with delay", "x"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    table.push_row(
        ["u2", "s1", "history", "this will explode", ""]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    table.push_row(
        ["u3", "s2", "procedures", "brain MRI", ""]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );

    let output = extractor.process_table(&table).await.unwrap();
    assert_eq!(
        output.headers,
        vec!["UUID", "study", "source_column", "source_column_value", "category", "term"]
    );
    assert_eq!(output.len(), 3);
    assert_eq!(output.get(0, "category"), Some("disease"));
    assert_eq!(output.get(0, "term"), Some("febrile seizures"));
    assert_eq!(output.get(1, "category"), Some("phenotype"));
    assert_eq!(output.get(2, "UUID"), Some("u3"));
    assert_eq!(output.get(2, "term"), Some("MRI"));
}

#[tokio::test]
async fn test_process_table_requires_input_columns() {
    let extractor = extractor(start_fake_llm().await);
    let table = Table::new(vec!["study".to_string(), "text".to_string()]);
    assert!(extractor.process_table(&table).await.is_err());
}
