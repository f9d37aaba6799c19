//! Remote snapshot host
//!
//! Snapshots are published as `{base_url}/{id}.db.gz`. The host exposes no
//! release feed, so freshness relies on the `Last-Modified` header.

use crate::config::HarmonicaConfig;
use crate::error::{HarmonicaError, Result};
use crate::ontology::{OntologyId, OntologyStore};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use reqwest::header::{CONTENT_LENGTH, LAST_MODIFIED};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// What the host reports about a snapshot without downloading it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub url: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_length: Option<u64>,
}

/// Connection setup limit for every request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a freshness check, which runs before the prompt
pub const DEFAULT_HEAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the snapshot host
pub struct RemoteSource {
    client: Client,
    base_url: String,
    head_timeout: Duration,
}

impl RemoteSource {
    pub fn new(config: &HarmonicaConfig) -> Result<Self> {
        Self::with_base_url(&config.remote_base_url, config.http_timeout_secs)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("harmonica/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarmonicaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            head_timeout: DEFAULT_HEAD_TIMEOUT.min(Duration::from_secs(timeout_secs)),
        })
    }

    /// Override how long `head` waits for a response
    pub fn with_head_timeout(mut self, timeout: Duration) -> Self {
        self.head_timeout = timeout;
        self
    }

    pub fn url_for(&self, id: &OntologyId) -> String {
        format!("{}/{}.db.gz", self.base_url, id)
    }

    /// HEAD the snapshot URL
    pub async fn head(&self, id: &OntologyId) -> Result<RemoteInfo> {
        let url = self.url_for(id);
        debug!("Checking remote snapshot: {}", url);

        let response = self
            .client
            .head(&url)
            .timeout(self.head_timeout)
            .send()
            .await
            .map_err(|e| HarmonicaError::Network(format!("HEAD {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(HarmonicaError::Network(format!(
                "{} returned status: {}",
                url,
                response.status()
            )));
        }

        let headers = response.headers();
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        Ok(RemoteInfo {
            url,
            last_modified,
            content_length,
        })
    }

    /// Download and install the snapshot for `id` at `dest`
    ///
    /// The body is staged in `.part` files beside `dest` and only renamed into
    /// place once it decompresses to a valid snapshot. Returns the installed size.
    pub async fn download(&self, id: &OntologyId, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let gz_path = dest.with_extension("db.gz.part");
        let db_path = dest.with_extension("db.part");

        let result = self.download_staged(id, &gz_path, &db_path, dest).await;

        for staged in [&gz_path, &db_path] {
            if staged.exists() {
                if let Err(e) = std::fs::remove_file(staged) {
                    warn!("Failed to remove {}: {}", staged.display(), e);
                }
            }
        }

        result
    }

    async fn download_staged(
        &self,
        id: &OntologyId,
        gz_path: &Path,
        db_path: &Path,
        dest: &Path,
    ) -> Result<u64> {
        let url = self.url_for(id);
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HarmonicaError::Network(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(HarmonicaError::Network(format!(
                "{} returned status: {}",
                url,
                response.status()
            )));
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(gz_path).await?;
        let mut received: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            if let Some(total) = total {
                eprint!("\rDownloading {}: {}/{} bytes ", id, received, total);
            }
        }
        file.flush().await?;
        drop(file);
        if total.is_some() {
            eprintln!();
        }
        debug!("Received {} compressed bytes for {}", received, id);

        let gz = gz_path.to_path_buf();
        let db = db_path.to_path_buf();
        let size = tokio::task::spawn_blocking(move || decompress_and_validate(&gz, &db))
            .await
            .map_err(|e| HarmonicaError::Other(format!("decompression task failed: {}", e)))??;

        tokio::fs::rename(db_path, dest).await?;
        info!("Installed snapshot {} ({} bytes)", dest.display(), size);
        Ok(size)
    }
}

fn decompress_and_validate(gz_path: &Path, db_path: &Path) -> Result<u64> {
    let input = std::fs::File::open(gz_path)?;
    let mut decoder = GzDecoder::new(input);
    let mut output = std::fs::File::create(db_path)?;
    let size = std::io::copy(&mut decoder, &mut output)
        .map_err(|e| HarmonicaError::Cache(format!("snapshot is not valid gzip: {}", e)))?;
    output.sync_all()?;
    drop(output);

    OntologyStore::open(db_path)?;
    Ok(size)
}

/// Parse an HTTP-date (`Wed, 21 Oct 2015 07:28:00 GMT`)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
