//! SPARQL transport: the client port, its HTTP implementation, escaping and
//! the query builders used by [`crate::store::SparqlTemplateStore`].

pub mod escape;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::bindings::SelectResponse;
use crate::error::{AnnotationError, Result};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Executes raw SPARQL against the triplestore.
#[async_trait]
pub trait SparqlClient: Send + Sync {
    async fn select(&self, query: &str) -> Result<SelectResponse>;

    /// Statements of any size are accepted; chunking happens above this layer.
    async fn update(&self, query: &str) -> Result<()>;
}

/// Posts queries as `application/x-www-form-urlencoded` with the
/// `mu-auth-sudo` header, so writes bypass mu-authorization.
pub struct HttpSparqlClient {
    client: Client,
    endpoint: Url,
}

impl HttpSparqlClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, query: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .header("mu-auth-sudo", "true")
            .form(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnotationError::Sparql {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    async fn select(&self, query: &str) -> Result<SelectResponse> {
        let body = self.post(query).await?.text().await?;
        let response: SelectResponse = serde_json::from_str(&body)?;
        debug!(rows = response.bindings().len(), "sparql select");
        Ok(response)
    }

    async fn update(&self, query: &str) -> Result<()> {
        self.post(query).await?;
        debug!(bytes = query.len(), "sparql update");
        Ok(())
    }
}
