//! Common test utilities and helpers

#![allow(dead_code)]

use axum::extract::{Path as AxumPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use harmonica_core::ontology::test_utils::{create_fixture_snapshot, FixtureTerm};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A published snapshot: gzipped body plus its `Last-Modified` header
#[derive(Clone)]
struct Published {
    body: Vec<u8>,
    last_modified: String,
}

type Files = Arc<Mutex<HashMap<String, Published>>>;

/// Local stand-in for the snapshot host, serving `/{id}.db.gz`
pub struct FakeSnapshotHost {
    pub base_url: String,
    files: Files,
}

impl FakeSnapshotHost {
    pub async fn start() -> Self {
        let files: Files = Arc::new(Mutex::new(HashMap::new()));
        let app = Router::new()
            .route("/:file", get(serve_snapshot))
            .with_state(files.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake snapshot host");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake snapshot host failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            files,
        }
    }

    /// Publish raw bytes as `{id}.db.gz`
    pub fn publish_raw(&self, id: &str, body: Vec<u8>, last_modified: DateTime<Utc>) {
        self.files.lock().unwrap().insert(
            format!("{}.db.gz", id),
            Published {
                body,
                last_modified: http_date(last_modified),
            },
        );
    }

    /// Publish a fixture snapshot for `id` with the given version IRI
    pub fn publish(&self, id: &str, version: &str, terms: &[FixtureTerm], last_modified: DateTime<Utc>) {
        self.publish_raw(id, gzipped_snapshot(id, version, terms), last_modified);
    }
}

async fn serve_snapshot(State(files): State<Files>, AxumPath(file): AxumPath<String>) -> Response {
    let published = files.lock().unwrap().get(&file).cloned();
    match published {
        Some(p) => ([(header::LAST_MODIFIED, p.last_modified)], p.body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Accepts connections and never answers; returns its base URL
pub async fn start_silent_host() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind silent host");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Format a timestamp as an HTTP-date
pub fn http_date(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build a fixture snapshot and return it gzip-compressed
pub fn gzipped_snapshot(id: &str, version: &str, terms: &[FixtureTerm]) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(format!("{}.db", id));
    create_fixture_snapshot(&path, id, Some(version), terms).unwrap();

    let raw = std::fs::read(&path).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    encoder.finish().unwrap()
}

pub fn mondo_terms() -> Vec<FixtureTerm> {
    vec![
        FixtureTerm::new("MONDO:0005015", "diabetes mellitus")
            .synonym("oio:hasExactSynonym", "diabetes"),
        FixtureTerm::new("MONDO:0005027", "epilepsy")
            .synonym("oio:hasRelatedSynonym", "seizure disorder"),
        // Cross-ontology term present in the MONDO snapshot
        FixtureTerm::new("HP:0001250", "seizure"),
    ]
}

pub fn hp_terms() -> Vec<FixtureTerm> {
    vec![
        FixtureTerm::new("HP:0001250", "Seizure").synonym("oio:hasExactSynonym", "fits"),
        FixtureTerm::new("HP:0001263", "Global developmental delay")
            .synonym("oio:hasNarrowSynonym", "developmental delay"),
    ]
}

/// Write a single-sheet workbook from string rows, the first being the header
pub fn write_workbook(path: &Path, sheet: &str, rows: &[&[&str]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}
