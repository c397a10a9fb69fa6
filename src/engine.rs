//! Entry points reacting to the three triggers: full rebuild, bulk clear and
//! incremental delta.
//!
//! Nothing is kept between invocations; every run re-reads its working set
//! from the store.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::delta::{extract_insert_uris, ChangeSet};
use crate::error::Result;
use crate::markup::MarkupContext;
use crate::pipeline::Pipeline;
use crate::propagation::{self, PropagationReport};
use crate::renderer::Renderer;
use crate::store::TemplateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub chunk_size: usize,
    pub rebuild_passes: usize,
    pub propagation_max_hops: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let config = ServiceConfig::default();
        Self::from(&config)
    }
}

impl From<&ServiceConfig> for EngineSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            rebuild_passes: config.rebuild_passes.max(1),
            propagation_max_hops: config.propagation_max_hops.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    NothingFound,
    Rebuilt { templates: usize, passes: usize },
}

/// Acknowledgement for an incremental change.
///
/// `Accepted` is returned once the directly changed templates are persisted;
/// propagation to embedding templates is still running in `propagation`.
#[derive(Debug)]
pub enum ChangeAck {
    EmptyDelta,
    NoTemplates,
    Accepted {
        templates: Vec<String>,
        propagation: JoinHandle<()>,
    },
}

#[derive(Clone)]
pub struct AnnotationEngine {
    pipeline: Arc<Pipeline>,
    settings: EngineSettings,
}

impl AnnotationEngine {
    pub fn new(store: Arc<dyn TemplateStore>, renderer: Renderer, settings: EngineSettings) -> Result<Self> {
        let pipeline = Pipeline::new(store, renderer, settings.chunk_size)?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            settings,
        })
    }

    pub fn from_config(config: &ServiceConfig, store: Arc<dyn TemplateStore>) -> Result<Self> {
        let renderer = Renderer::new(
            config.artifact_kind,
            MarkupContext::new(config.source_endpoint.clone()),
        );
        Self::new(store, renderer, EngineSettings::from(config))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Render and persist every template, `rebuild_passes` times so that
    /// artifacts embedded through instructions settle.
    pub async fn rebuild_all(&self) -> Result<RebuildOutcome> {
        let span = info_span!("rebuild_all", run_id = %Uuid::new_v4());
        self.run_rebuild_passes().instrument(span).await
    }

    async fn run_rebuild_passes(&self) -> Result<RebuildOutcome> {
        let mut templates = 0;
        let mut passes = 0;
        for pass in 1..=self.settings.rebuild_passes {
            let written = self.pipeline.refresh(None).await?;
            if written.is_empty() {
                if pass == 1 {
                    warn!("no templates found");
                    return Ok(RebuildOutcome::NothingFound);
                }
                break;
            }
            templates = written.len();
            passes = pass;
            info!(pass, templates, "rebuild pass complete");
        }
        Ok(RebuildOutcome::Rebuilt { templates, passes })
    }

    /// Retract every stored artifact. Returns the number of templates cleared.
    pub async fn clear_all(&self) -> Result<usize> {
        let span = info_span!("clear_all", run_id = %Uuid::new_v4());
        self.pipeline.clear_all().instrument(span).await
    }

    /// Re-render the templates whose subjects were inserted, then hand the
    /// embedders off to a background task.
    pub async fn apply_change(&self, changes: &[ChangeSet]) -> Result<ChangeAck> {
        let run_id = Uuid::new_v4();
        let span = info_span!("apply_change", %run_id);
        let outcome = self.refresh_changed(changes).instrument(span).await?;

        Ok(match outcome {
            None => ChangeAck::EmptyDelta,
            Some(written) if written.is_empty() => ChangeAck::NoTemplates,
            Some(written) => {
                let propagation = self.spawn_propagation(run_id, written.clone());
                ChangeAck::Accepted {
                    templates: written,
                    propagation,
                }
            }
        })
    }

    /// `None` for an empty delta, otherwise the templates rewritten.
    async fn refresh_changed(&self, changes: &[ChangeSet]) -> Result<Option<Vec<String>>> {
        if changes.is_empty() {
            warn!("no delta found");
            return Ok(None);
        }
        let subjects = extract_insert_uris(changes);
        let templates = self.pipeline.fetch(Some(&subjects)).await?;
        if templates.is_empty() {
            warn!(subjects = subjects.len(), "no templates found");
            return Ok(Some(Vec::new()));
        }
        let written = self.pipeline.render_and_persist(&templates).await?;
        Ok(Some(written))
    }

    /// Refresh embedders of `changed` in the foreground.
    pub async fn propagate(&self, changed: &[String]) -> Result<PropagationReport> {
        propagation::propagate(&self.pipeline, changed, self.settings.propagation_max_hops).await
    }

    /// Detached propagation. Failures are logged; the caller has already
    /// been answered.
    fn spawn_propagation(&self, run_id: Uuid, changed: Vec<String>) -> JoinHandle<()> {
        let engine = self.clone();
        let span = info_span!("propagation", %run_id);
        tokio::spawn(
            async move {
                match engine.propagate(&changed).await {
                    Ok(report) if report.refreshed.is_empty() => {
                        info!("no linked templates to update");
                    }
                    Ok(report) => {
                        info!(
                            hops = report.hops,
                            refreshed = report.refreshed.len(),
                            "propagation complete"
                        );
                    }
                    Err(e) => error!("propagation failed: {e}"),
                }
            }
            .instrument(span),
        )
    }
}
