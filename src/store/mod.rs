//! Storage port for templates and their derived artifacts.
//!
//! The engine depends only on [`TemplateStore`]. `SparqlTemplateStore` talks
//! to the triplestore; `InMemoryTemplateStore` keeps the same graph shape in
//! process.

mod memory;
mod sparql;

pub use memory::InMemoryTemplateStore;
pub use sparql::SparqlTemplateStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{RenderedTemplate, Template};

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Templates with variables resolved, instruction variables carrying the
    /// linked template's current artifact.
    ///
    /// `None` fetches every template. `Some(&[])` returns nothing without
    /// touching the backend.
    async fn fetch_templates(&self, filter: Option<&[String]>) -> Result<Vec<Template>>;

    /// URIs of templates that currently carry a derived artifact.
    async fn artifact_uris(&self) -> Result<Vec<String>>;

    /// Distinct URIs of templates embedding any of `uris` through an
    /// instruction variable.
    async fn dependents_of(&self, uris: &[String]) -> Result<Vec<String>>;

    /// One combined write: retract every old artifact in `chunk`, then assert
    /// the new values.
    async fn replace_artifacts(&self, chunk: &[RenderedTemplate]) -> Result<()>;

    /// Retract the artifact of every template in `uris`.
    async fn retract_artifacts(&self, uris: &[String]) -> Result<()>;
}
