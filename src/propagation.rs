//! Dependency propagation along instruction edges.
//!
//! Each hop asks the store which templates embed the previous hop's templates
//! and re-renders them, which picks up the freshly written artifacts. A
//! template is refreshed at most once per run, so cyclic links terminate.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::store::TemplateStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Hops that found and refreshed at least one dependent.
    pub hops: usize,
    /// Refreshed templates, in the order they were written.
    pub refreshed: Vec<String>,
}

/// Templates embedding any of `changed` through an instruction variable.
pub async fn find_dependents(store: &dyn TemplateStore, changed: &[String]) -> Result<Vec<String>> {
    if changed.is_empty() {
        return Ok(Vec::new());
    }
    let dependents = store.dependents_of(changed).await?;
    debug!(changed = changed.len(), dependents = dependents.len(), "dependents resolved");
    Ok(dependents)
}

/// Refresh dependents of `changed`, following at most `max_hops` links.
///
/// With `max_hops == 1` only direct embedders are refreshed; longer chains
/// need another trigger.
pub async fn propagate(pipeline: &Pipeline, changed: &[String], max_hops: usize) -> Result<PropagationReport> {
    let mut report = PropagationReport::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier = changed.to_vec();

    for hop in 1..=max_hops {
        let dependents: Vec<String> = find_dependents(pipeline.store(), &frontier)
            .await?
            .into_iter()
            .filter(|uri| visited.insert(uri.clone()))
            .collect();
        if dependents.is_empty() {
            break;
        }

        let refreshed = pipeline.refresh(Some(&dependents)).await?;
        info!(hop, refreshed = refreshed.len(), "linked templates refreshed");
        report.hops = hop;
        report.refreshed.extend(refreshed.iter().cloned());
        frontier = refreshed;
    }

    Ok(report)
}
