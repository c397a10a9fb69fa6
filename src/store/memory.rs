use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::error::{AnnotationError, Result};
use crate::model::{RenderedTemplate, Template, Variable, VariableType};

use super::TemplateStore;

#[derive(Debug, Clone)]
struct StoredVariable {
    variable: Variable,
    /// Template an instruction variable points at.
    target: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    uri: String,
    raw_text: String,
    variables: Vec<StoredVariable>,
}

#[derive(Debug, Default)]
struct Graph {
    templates: Vec<StoredTemplate>,
    artifacts: HashMap<String, String>,
}

impl Graph {
    fn template_mut(&mut self, uri: &str) -> Result<&mut StoredTemplate> {
        self.templates
            .iter_mut()
            .find(|t| t.uri == uri)
            .ok_or_else(|| AnnotationError::InvalidInput(format!("unknown template {uri}")))
    }

    fn resolve(&self, stored: &StoredTemplate) -> Template {
        let variables = stored
            .variables
            .iter()
            .map(|sv| {
                let mut variable = sv.variable.clone();
                variable.linked_artifact = sv
                    .target
                    .as_ref()
                    .and_then(|target| self.artifacts.get(target))
                    .cloned();
                variable
            })
            .collect();
        Template {
            uri: stored.uri.clone(),
            raw_text: stored.raw_text.clone(),
            variables,
        }
    }
}

/// In-process [`TemplateStore`] holding one artifact kind.
///
/// Counts backend round trips and can be told to fail writes, which is what
/// the engine's partial-failure paths are exercised against.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    graph: Mutex<Graph>,
    selects: AtomicUsize,
    writes: AtomicUsize,
    /// Writes allowed before every further write fails.
    fail_after_writes: Mutex<Option<usize>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Graph>> {
        self.graph
            .lock()
            .map_err(|_| AnnotationError::Internal(anyhow!("template graph lock poisoned")))
    }

    pub fn insert_template(&self, uri: &str, raw_text: &str) -> Result<()> {
        let mut graph = self.lock()?;
        graph.templates.retain(|t| t.uri != uri);
        graph.templates.push(StoredTemplate {
            uri: uri.to_string(),
            raw_text: raw_text.to_string(),
            variables: Vec::new(),
        });
        Ok(())
    }

    pub fn set_raw_text(&self, uri: &str, raw_text: &str) -> Result<()> {
        self.lock()?.template_mut(uri)?.raw_text = raw_text.to_string();
        Ok(())
    }

    pub fn add_variable(&self, template: &str, variable: Variable) -> Result<()> {
        self.lock()?.template_mut(template)?.variables.push(StoredVariable {
            variable,
            target: None,
        });
        Ok(())
    }

    /// Add an instruction variable embedding `target`'s artifact.
    pub fn add_instruction(&self, template: &str, variable_uri: &str, name: &str, target: &str) -> Result<()> {
        self.lock()?.template_mut(template)?.variables.push(StoredVariable {
            variable: Variable::new(variable_uri, name, VariableType::Instruction),
            target: Some(target.to_string()),
        });
        Ok(())
    }

    pub fn artifact(&self, uri: &str) -> Result<Option<String>> {
        Ok(self.lock()?.artifacts.get(uri).cloned())
    }

    pub fn set_artifact(&self, uri: &str, artifact: &str) -> Result<()> {
        self.lock()?
            .artifacts
            .insert(uri.to_string(), artifact.to_string());
        Ok(())
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_after_writes(&self, allowed: usize) -> Result<()> {
        *self
            .fail_after_writes
            .lock()
            .map_err(|_| AnnotationError::Internal(anyhow!("failure switch poisoned")))? = Some(allowed);
        Ok(())
    }

    fn begin_write(&self) -> Result<()> {
        let allowed = *self
            .fail_after_writes
            .lock()
            .map_err(|_| AnnotationError::Internal(anyhow!("failure switch poisoned")))?;
        let done = self.writes.load(Ordering::SeqCst);
        if allowed.is_some_and(|allowed| done >= allowed) {
            return Err(AnnotationError::Sparql {
                status: 503,
                body: "write rejected".into(),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn fetch_templates(&self, filter: Option<&[String]>) -> Result<Vec<Template>> {
        if filter.is_some_and(|uris| uris.is_empty()) {
            return Ok(Vec::new());
        }
        self.selects.fetch_add(1, Ordering::SeqCst);
        let wanted: Option<HashSet<&str>> =
            filter.map(|uris| uris.iter().map(String::as_str).collect());
        let graph = self.lock()?;
        Ok(graph
            .templates
            .iter()
            .filter(|t| wanted.as_ref().is_none_or(|w| w.contains(t.uri.as_str())))
            .map(|t| graph.resolve(t))
            .collect())
    }

    async fn artifact_uris(&self) -> Result<Vec<String>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        let graph = self.lock()?;
        Ok(graph
            .templates
            .iter()
            .filter(|t| graph.artifacts.contains_key(&t.uri))
            .map(|t| t.uri.clone())
            .collect())
    }

    async fn dependents_of(&self, uris: &[String]) -> Result<Vec<String>> {
        if uris.is_empty() {
            return Ok(Vec::new());
        }
        self.selects.fetch_add(1, Ordering::SeqCst);
        let changed: HashSet<&str> = uris.iter().map(String::as_str).collect();
        let graph = self.lock()?;
        Ok(graph
            .templates
            .iter()
            .filter(|t| {
                t.variables.iter().any(|sv| {
                    sv.target
                        .as_deref()
                        .is_some_and(|target| changed.contains(target))
                })
            })
            .map(|t| t.uri.clone())
            .collect())
    }

    async fn replace_artifacts(&self, chunk: &[RenderedTemplate]) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.begin_write()?;
        let mut graph = self.lock()?;
        for item in chunk {
            graph.artifacts.remove(&item.uri);
        }
        for item in chunk {
            graph.artifacts.insert(item.uri.clone(), item.rendered.clone());
        }
        Ok(())
    }

    async fn retract_artifacts(&self, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }
        self.begin_write()?;
        let mut graph = self.lock()?;
        for uri in uris {
            graph.artifacts.remove(uri);
        }
        Ok(())
    }
}
