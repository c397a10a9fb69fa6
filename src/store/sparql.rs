use std::sync::Arc;

use async_trait::async_trait;

use crate::bindings::{column_values, columns, parse_template_bindings};
use crate::error::Result;
use crate::model::{ArtifactKind, RenderedTemplate, Template};
use crate::sparql::{queries, SparqlClient};

use super::TemplateStore;

/// [`TemplateStore`] backed by a SPARQL endpoint.
pub struct SparqlTemplateStore {
    client: Arc<dyn SparqlClient>,
    kind: ArtifactKind,
    graph: String,
}

impl SparqlTemplateStore {
    pub fn new(client: Arc<dyn SparqlClient>, kind: ArtifactKind, graph: impl Into<String>) -> Self {
        Self {
            client,
            kind,
            graph: graph.into(),
        }
    }
}

#[async_trait]
impl TemplateStore for SparqlTemplateStore {
    async fn fetch_templates(&self, filter: Option<&[String]>) -> Result<Vec<Template>> {
        if filter.is_some_and(|uris| uris.is_empty()) {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .select(&queries::select_templates(self.kind, filter))
            .await?;
        parse_template_bindings(response.bindings())
    }

    async fn artifact_uris(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .select(&queries::select_artifact_uris(self.kind, &self.graph))
            .await?;
        column_values(response.bindings(), columns::URI)
    }

    async fn dependents_of(&self, uris: &[String]) -> Result<Vec<String>> {
        if uris.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.client.select(&queries::select_dependents(uris)).await?;
        column_values(response.bindings(), columns::DEPENDENT_URI)
    }

    async fn replace_artifacts(&self, chunk: &[RenderedTemplate]) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.client
            .update(&queries::replace_artifacts(self.kind, &self.graph, chunk))
            .await
    }

    async fn retract_artifacts(&self, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }
        self.client
            .update(&queries::retract_artifacts(self.kind, &self.graph, uris))
            .await
    }
}
