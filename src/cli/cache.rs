//! Cache maintenance commands (clear-cache, fetch)

use harmonica_core::{icons, reconcile, HarmonicaConfig, OntologyCache, RemoteSource, Result};
use tracing::debug;

use super::helpers::parse_ontology_ids;

/// Handle clear-cache command
pub fn handle_clear(oid: &str, config: &HarmonicaConfig) -> Result<()> {
    debug!("Running clear-cache command...");

    let ids = parse_ontology_ids(oid)?;
    let cache = OntologyCache::new(config);

    for id in &ids {
        let path = cache.path_for(id);
        if cache.clear(id)? {
            println!("{} Removed cached DB: {}", icons::status::success(), path.display());
        } else {
            println!("{} No cached DB found for {}", icons::status::info(), id);
        }
    }
    Ok(())
}

/// Handle fetch command
pub async fn handle_fetch(oid: &str, refresh: bool, config: &HarmonicaConfig) -> Result<()> {
    debug!("Running fetch command...");

    let ids = parse_ontology_ids(oid)?;
    let cache = OntologyCache::new(config);
    let remote = RemoteSource::new(config)?;

    for id in &ids {
        if refresh {
            println!("{} Refreshing {}...", icons::action::sync(), id);
        } else if cache.path_for(id).exists() {
            println!("{} {} already cached", icons::status::success(), id);
        }
        let store = cache.ensure(id, refresh, &remote).await?;
        reconcile::display_installed(id, &store, &mut std::io::stdout())?;
    }
    Ok(())
}
