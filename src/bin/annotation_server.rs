//! annotation_server keeps template annotations in sync with the triplestore.
//!
//! Reads config from env vars (see `ServiceConfig`):
//!   MU_SPARQL_ENDPOINT: triplestore endpoint (default: http://database:8890/sparql)
//!   ARTIFACT_KIND     : `annotated` or `preview` (default: annotated)
//!   BIND_ADDR         : listen address (default: 0.0.0.0:80)

use std::sync::Arc;

use anyhow::Context;
use template_annotator::api::build_router;
use template_annotator::sparql::{HttpSparqlClient, SparqlClient};
use template_annotator::store::{SparqlTemplateStore, TemplateStore};
use template_annotator::{AnnotationEngine, ServiceConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,template_annotator=debug".into()),
        )
        .init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        endpoint = %config.sparql_endpoint,
        kind = %config.artifact_kind,
        graph = %config.graph,
        "configuration loaded"
    );

    let client: Arc<dyn SparqlClient> = Arc::new(HttpSparqlClient::new(
        config.sparql_endpoint.clone(),
        config.sparql_timeout,
    )?);
    let store: Arc<dyn TemplateStore> = Arc::new(SparqlTemplateStore::new(
        client,
        config.artifact_kind,
        config.graph.clone(),
    ));
    let engine = AnnotationEngine::from_config(&config, store)?;

    let app = build_router(engine);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("annotation_server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
