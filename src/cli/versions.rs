//! Versions command: show cached snapshot versions and freshness

use harmonica_core::{
    icons, reconcile, HarmonicaConfig, OntologyCache, OntologyStore, RemoteSource, Result,
};
use tracing::debug;

use super::helpers::parse_ontology_ids;

/// Handle versions command
pub async fn handle(oid: &str, offline: bool, config: &HarmonicaConfig) -> Result<()> {
    debug!("Running versions command...");

    let ids = parse_ontology_ids(oid)?;
    let cache = OntologyCache::new(config);
    let remote = if offline {
        None
    } else {
        Some(RemoteSource::new(config)?)
    };

    let statuses = reconcile::collect_statuses(&ids, &cache, remote.as_ref()).await?;
    reconcile::display_statuses(&statuses, &mut std::io::stdout())?;

    println!();
    println!("{} Cache directory: {}", icons::data::folder(), cache.cache_dir().display());
    for status in &statuses {
        if let (Some(size), Some(modified)) = (status.entry.size, status.entry.modified) {
            let terms = OntologyStore::open(&status.entry.path)
                .and_then(|store| store.term_count())
                .map(|count| format!("{} terms", count))
                .unwrap_or_else(|_| "term count unavailable".to_string());
            println!(
                "   {} {}.db  {} bytes, {}, modified {}",
                icons::data::database(),
                status.entry.id,
                size,
                terms,
                modified.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    if statuses.iter().any(|s| s.freshness.is_stale()) {
        println!();
        println!("Run 'harmonica fetch --refresh --oid {}' to update", oid);
    }
    Ok(())
}
