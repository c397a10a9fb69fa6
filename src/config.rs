//! Service configuration, read from the environment.

use std::time::Duration;

use url::Url;

use crate::error::{AnnotationError, Result};
use crate::materializer::DEFAULT_CHUNK_SIZE;
use crate::model::ArtifactKind;

pub const DEFAULT_SPARQL_ENDPOINT: &str = "http://database:8890/sparql";
pub const DEFAULT_GRAPH: &str = "http://mu.semte.ch/graphs/mow/registry";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:80";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Triplestore queried and updated by the service.
    pub sparql_endpoint: Url,
    /// Advertised as `dct:source` in generated markup.
    pub source_endpoint: String,
    /// Graph holding the derived artifacts.
    pub graph: String,
    pub artifact_kind: ArtifactKind,
    pub chunk_size: usize,
    /// Fetch/render/persist cycles per full rebuild.
    pub rebuild_passes: usize,
    /// Instruction links followed after an incremental change.
    pub propagation_max_hops: usize,
    pub sparql_timeout: Duration,
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sparql_endpoint: Url::parse(DEFAULT_SPARQL_ENDPOINT).expect("valid default endpoint"),
            source_endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            graph: DEFAULT_GRAPH.to_string(),
            artifact_kind: ArtifactKind::Annotated,
            chunk_size: DEFAULT_CHUNK_SIZE,
            rebuild_passes: 2,
            propagation_max_hops: 1,
            sparql_timeout: Duration::from_secs(60),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sparql_endpoint = match get("MU_SPARQL_ENDPOINT") {
            Some(raw) => parse_url("MU_SPARQL_ENDPOINT", &raw)?,
            None => defaults.sparql_endpoint,
        };
        let source_endpoint = match get("SPARQL_ENDPOINT") {
            Some(raw) => parse_url("SPARQL_ENDPOINT", &raw)?.to_string(),
            None => sparql_endpoint.to_string(),
        };
        let graph = match get("TARGET_GRAPH") {
            Some(raw) => parse_url("TARGET_GRAPH", &raw)?.to_string(),
            None => defaults.graph,
        };
        let artifact_kind = match get("ARTIFACT_KIND") {
            Some(raw) => raw.parse()?,
            None => defaults.artifact_kind,
        };

        let config = Self {
            sparql_endpoint,
            source_endpoint,
            graph,
            artifact_kind,
            chunk_size: parse_count(get("CHUNK_SIZE"), "CHUNK_SIZE", defaults.chunk_size)?,
            rebuild_passes: parse_count(
                get("REBUILD_PASSES"),
                "REBUILD_PASSES",
                defaults.rebuild_passes,
            )?,
            propagation_max_hops: parse_count(
                get("PROPAGATION_MAX_HOPS"),
                "PROPAGATION_MAX_HOPS",
                defaults.propagation_max_hops,
            )?,
            sparql_timeout: Duration::from_secs(parse_count(
                get("SPARQL_TIMEOUT_SECS"),
                "SPARQL_TIMEOUT_SECS",
                defaults.sparql_timeout.as_secs() as usize,
            )? as u64),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
        };
        Ok(config)
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|e| AnnotationError::Config(format!("{key}: {e}")))
}

/// Positive integer setting.
fn parse_count(raw: Option<String>, key: &str, default: usize) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(AnnotationError::Config(format!("{key} must be at least 1"))),
        Ok(n) => Ok(n),
        Err(e) => Err(AnnotationError::Config(format!("{key}: {e}"))),
    }
}
