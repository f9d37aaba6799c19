//! Cache reconciliation before annotating
//!
//! Shows the cached version and freshness of every requested ontology, then
//! asks whether to continue with the cache, refresh it, or stop.

use crate::error::Result;
use crate::harmonize;
use crate::icons;
use crate::sheet::Table;
use crate::ontology::{CacheEntry, Freshness, OntologyCache, OntologyId, OntologyStore, RemoteSource};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Cached state of one ontology as presented to the user
#[derive(Debug, Clone)]
pub struct OntologyStatus {
    pub entry: CacheEntry,
    pub freshness: Freshness,
}

/// Outcome of reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Annotate against the snapshots already cached (missing ones are fetched)
    UseCached,
    /// Download fresh snapshots before annotating
    Refresh,
    /// Stop without annotating
    Abort,
}

/// Source of yes/no answers
pub trait Prompter {
    /// Ask a `[Y/n]` question; only an explicit `n` returns `false`
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interprets a typed answer; anything but `n` means yes
pub fn parse_answer(input: &str) -> bool {
    !input.trim().eq_ignore_ascii_case("n")
}

/// Prompts on stdout and reads answers from stdin
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{} [Y/n]: ", question);
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            debug!("stdin closed, taking default answer");
            return Ok(true);
        }
        Ok(parse_answer(&input))
    }
}

/// Replays fixed answers; defaults to yes once exhausted
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(true))
    }
}

/// Inspect the cache, and the remote host unless `remote` is `None`, for every ontology
pub async fn collect_statuses(
    ids: &[OntologyId],
    cache: &OntologyCache,
    remote: Option<&RemoteSource>,
) -> Result<Vec<OntologyStatus>> {
    let mut statuses = Vec::with_capacity(ids.len());
    for id in ids {
        let entry = cache.inspect(id)?;
        let freshness = match remote {
            Some(remote) => cache.check_freshness(&entry, remote).await,
            None => cache.offline_freshness(&entry),
        };
        statuses.push(OntologyStatus { entry, freshness });
    }
    Ok(statuses)
}

/// Print the cached version of every ontology
pub fn display_statuses<W: Write>(statuses: &[OntologyStatus], out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Checking local ontology versions...")?;
    for status in statuses {
        let marker = if status.entry.version_error.is_some() {
            icons::status::error()
        } else if status.freshness.is_stale() {
            icons::status::warning()
        } else {
            icons::status::success()
        };
        writeln!(
            out,
            "  {} {}: {} [{}]",
            marker,
            status.entry.id.as_str().to_uppercase(),
            status.entry.version_display(),
            status.freshness
        )?;
    }
    Ok(())
}

/// Show the cache state and ask how to proceed
pub fn decide<P: Prompter, W: Write>(
    statuses: &[OntologyStatus],
    prompter: &mut P,
    out: &mut W,
) -> Result<Decision> {
    display_statuses(statuses, out)?;
    writeln!(out)?;
    out.flush()?;

    if prompter.confirm("Would you like to continue with these cached versions?")? {
        info!("Continuing with cached ontology versions");
        return Ok(Decision::UseCached);
    }

    if prompter.confirm("Would you like to download updated versions?")? {
        info!("Refreshing cached ontology versions");
        Ok(Decision::Refresh)
    } else {
        writeln!(out, "Exiting.")?;
        Ok(Decision::Abort)
    }
}

/// Inspect every requested ontology, show its state and ask how to proceed
pub async fn reconcile<P: Prompter, W: Write>(
    ids: &[OntologyId],
    cache: &OntologyCache,
    remote: Option<&RemoteSource>,
    prompter: &mut P,
    out: &mut W,
) -> Result<Decision> {
    let statuses = collect_statuses(ids, cache, remote).await?;
    decide(&statuses, prompter, out)
}

/// Open (or fetch, or refresh) every snapshot and annotate `table` against it
///
/// `Decision::Refresh` downloads each snapshot again before annotating; the
/// installed version is printed either way. `Abort` annotates nothing.
pub async fn annotate_all<W: Write>(
    table: &Table,
    search_column: usize,
    ids: &[OntologyId],
    cache: &OntologyCache,
    remote: &RemoteSource,
    decision: Decision,
    out: &mut W,
) -> Result<Vec<(OntologyId, Table)>> {
    if decision == Decision::Abort {
        return Ok(Vec::new());
    }
    let refresh = decision == Decision::Refresh;

    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        if refresh {
            writeln!(out, "{} Refreshing {}...", icons::action::sync(), id)?;
        }
        let store = cache.ensure(id, refresh, remote).await?;
        display_installed(id, &store, out)?;

        let (annotated, stats) = harmonize::annotate(table, id, &store, search_column)?;
        writeln!(
            out,
            "{} {}: {} label, {} synonym, {} unmatched",
            icons::action::search(),
            id.as_str().to_uppercase(),
            stats.label_matches,
            stats.alias_matches,
            stats.unmatched()
        )?;
        results.push((id.clone(), annotated));
    }
    Ok(results)
}

/// Print the version of a snapshot that is about to be used
pub fn display_installed<W: Write>(id: &OntologyId, store: &OntologyStore, out: &mut W) -> Result<()> {
    match store.version_iri() {
        Ok(version) => writeln!(
            out,
            "{} {} version: {}",
            icons::data::package(),
            id.as_str().to_uppercase(),
            version.as_deref().unwrap_or("unknown")
        )?,
        Err(e) => writeln!(
            out,
            "{} Could not fetch version metadata for {}: {}",
            icons::status::warning(),
            id,
            e
        )?,
    }
    Ok(())
}
