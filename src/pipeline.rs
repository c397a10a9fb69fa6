//! Fetch → render → persist, the unit of work every entry point repeats.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::materializer::Materializer;
use crate::model::Template;
use crate::renderer::Renderer;
use crate::store::TemplateStore;

pub struct Pipeline {
    store: Arc<dyn TemplateStore>,
    renderer: Renderer,
    materializer: Materializer,
}

impl Pipeline {
    pub fn new(store: Arc<dyn TemplateStore>, renderer: Renderer, chunk_size: usize) -> Result<Self> {
        let materializer = Materializer::new(Arc::clone(&store), chunk_size)?;
        Ok(Self {
            store,
            renderer,
            materializer,
        })
    }

    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub async fn fetch(&self, filter: Option<&[String]>) -> Result<Vec<Template>> {
        let templates = self.store.fetch_templates(filter).await?;
        debug!(count = templates.len(), "templates fetched");
        Ok(templates)
    }

    /// Render and persist `templates`, returning the URIs written.
    pub async fn render_and_persist(&self, templates: &[Template]) -> Result<Vec<String>> {
        if templates.is_empty() {
            return Ok(Vec::new());
        }
        let rendered = self.renderer.render_all(templates)?;
        let chunks = self.materializer.persist(&rendered).await?;
        info!(
            kind = %self.renderer.kind(),
            templates = rendered.len(),
            chunks,
            "artifacts persisted"
        );
        Ok(rendered.into_iter().map(|item| item.uri).collect())
    }

    /// Re-fetch the templates matching `filter` and rewrite their artifacts.
    pub async fn refresh(&self, filter: Option<&[String]>) -> Result<Vec<String>> {
        let templates = self.fetch(filter).await?;
        self.render_and_persist(&templates).await
    }

    /// Retract every stored artifact. Returns the number of templates cleared.
    pub async fn clear_all(&self) -> Result<usize> {
        let uris = self.store.artifact_uris().await?;
        let chunks = self.materializer.clear(&uris).await?;
        info!(templates = uris.len(), chunks, "artifacts cleared");
        Ok(uris.len())
    }
}
