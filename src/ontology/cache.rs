//! Local snapshot cache and freshness assessment
//!
//! Each ontology is cached as `{cache_dir}/{id}.db`. A cached snapshot is
//! considered stale when the remote copy is newer than the local file, or when
//! it is older than `max_cache_age_days` and the remote gives no answer.

use crate::config::HarmonicaConfig;
use crate::error::{HarmonicaError, Result};
use crate::ontology::{OntologyId, OntologyStore, RemoteInfo, RemoteSource};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upper bound keeping the age arithmetic in range
const MAX_CACHE_AGE_DAYS: u64 = 365_000;

/// State of one cached snapshot on disk
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub id: OntologyId,
    pub path: PathBuf,
    pub exists: bool,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub version: Option<String>,
    /// Why the version could not be read, if it could not
    pub version_error: Option<String>,
}

impl CacheEntry {
    /// Human-readable version, as shown before prompting
    pub fn version_display(&self) -> String {
        if !self.exists {
            "not cached".to_string()
        } else if let Some(version) = &self.version {
            version.clone()
        } else if let Some(error) = &self.version_error {
            format!("Error loading version ({})", error)
        } else {
            "Unknown".to_string()
        }
    }
}

/// Freshness of a cached snapshot relative to the remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing cached yet
    Missing,
    /// Local copy is at least as new as the remote one
    Fresh,
    /// Remote copy is newer, or the local copy exceeded the maximum age
    Stale {
        local: DateTime<Utc>,
        remote: Option<DateTime<Utc>>,
    },
    /// Could not decide (remote unreachable or undated, cache within max age)
    Unknown(String),
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. } | Freshness::Missing)
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Missing => write!(f, "missing"),
            Freshness::Fresh => write!(f, "up to date"),
            Freshness::Stale {
                local,
                remote: Some(remote),
            } => write!(
                f,
                "stale (cached {}, remote {})",
                local.format("%Y-%m-%d"),
                remote.format("%Y-%m-%d")
            ),
            Freshness::Stale { local, remote: None } => {
                write!(f, "stale (cached {})", local.format("%Y-%m-%d"))
            }
            Freshness::Unknown(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Decide freshness from the local entry and what the remote reported
///
/// A remote `Last-Modified` is authoritative. Without one the local age
/// against `max_age` decides, and within that age the answer is `Unknown`.
pub fn assess(
    entry: &CacheEntry,
    remote: std::result::Result<&RemoteInfo, String>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Freshness {
    if !entry.exists {
        return Freshness::Missing;
    }
    let Some(local) = entry.modified else {
        return Freshness::Unknown("cached file has no modification time".to_string());
    };

    let reason = match remote {
        Ok(RemoteInfo {
            last_modified: Some(remote_modified),
            ..
        }) => {
            return if *remote_modified > local {
                Freshness::Stale {
                    local,
                    remote: Some(*remote_modified),
                }
            } else {
                Freshness::Fresh
            };
        }
        Ok(_) => "remote reports no modification date".to_string(),
        Err(reason) => reason,
    };

    if now - local > max_age {
        Freshness::Stale { local, remote: None }
    } else {
        Freshness::Unknown(reason)
    }
}

/// Directory of cached snapshots
pub struct OntologyCache {
    cache_dir: PathBuf,
    max_age: Duration,
}

impl OntologyCache {
    pub fn new(config: &HarmonicaConfig) -> Self {
        Self::with_dir(config.cache_dir.clone(), config.max_cache_age_days)
    }

    pub fn with_dir(cache_dir: PathBuf, max_cache_age_days: u64) -> Self {
        Self {
            cache_dir,
            max_age: Duration::days(max_cache_age_days.min(MAX_CACHE_AGE_DAYS) as i64),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path_for(&self, id: &OntologyId) -> PathBuf {
        self.cache_dir.join(format!("{}.db", id))
    }

    /// Inspect the cached snapshot; version lookup problems are recorded, not raised
    pub fn inspect(&self, id: &OntologyId) -> Result<CacheEntry> {
        let path = self.path_for(id);
        let mut entry = CacheEntry {
            id: id.clone(),
            path: path.clone(),
            exists: path.exists(),
            size: None,
            modified: None,
            version: None,
            version_error: None,
        };

        if !entry.exists {
            debug!("No cached snapshot for {} at {}", id, path.display());
            return Ok(entry);
        }

        let metadata = std::fs::metadata(&path)?;
        entry.size = Some(metadata.len());
        entry.modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        match OntologyStore::open(&path).and_then(|store| store.version_iri()) {
            Ok(version) => entry.version = version,
            Err(e) => {
                warn!("Could not read version metadata for {}: {}", id, e);
                entry.version_error = Some(e.to_string());
            }
        }

        Ok(entry)
    }

    /// Compare the cached snapshot with the remote host; never fails on network errors
    pub async fn check_freshness(&self, entry: &CacheEntry, remote: &RemoteSource) -> Freshness {
        if !entry.exists {
            return Freshness::Missing;
        }

        let info = remote.head(&entry.id).await;
        if let Err(e) = &info {
            warn!("Remote freshness check for {} failed: {}", entry.id, e);
        }
        let freshness = assess(
            entry,
            info.as_ref().map_err(|e| e.to_string()),
            Utc::now(),
            self.max_age,
        );
        debug!("Freshness of {}: {}", entry.id, freshness);
        freshness
    }

    /// Freshness from local age alone, for when the remote is not consulted
    pub fn offline_freshness(&self, entry: &CacheEntry) -> Freshness {
        assess(
            entry,
            Err("remote check skipped".to_string()),
            Utc::now(),
            self.max_age,
        )
    }

    /// Delete a cached snapshot; returns whether a file was removed
    pub fn clear(&self, id: &OntologyId) -> Result<bool> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!("Removed cached snapshot: {}", path.display());
            Ok(true)
        } else {
            debug!("No cached snapshot to remove for {}", id);
            Ok(false)
        }
    }

    /// Open the snapshot for `id`, downloading it when missing or when `refresh` is set
    ///
    /// A refresh replaces the cached file only after the new one validates, so a
    /// failed download leaves the previous snapshot usable.
    pub async fn ensure(
        &self,
        id: &OntologyId,
        refresh: bool,
        remote: &RemoteSource,
    ) -> Result<OntologyStore> {
        let path = self.path_for(id);

        if refresh || !path.exists() {
            if refresh && path.exists() {
                info!("Refreshing cached snapshot: {}", path.display());
            } else {
                info!("No cached snapshot for {}, fetching", id);
            }
            remote.download(id, &path).await?;
        }

        OntologyStore::open(&path).map_err(|e| match e {
            HarmonicaError::Cache(msg) => HarmonicaError::Cache(format!(
                "{} (run `harmonica clear-cache --oid {}` to discard it)",
                msg, id
            )),
            other => other,
        })
    }
}
