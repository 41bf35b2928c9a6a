//! Cluster connection used by the schema orchestrator.

use std::sync::Arc;

use anyhow::Result;
use elasticsearch::{
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{EsWorkOrchestrator, WorkOrchestrator};

/// Connection to one cluster
#[derive(Clone)]
pub struct EsClient {
    client: Elasticsearch,
    pub es_url: String,
}

impl EsClient {
    /// Connect to a single-node cluster
    pub async fn new(es_url: &str) -> Result<Self> {
        let url = Url::parse(es_url)?;
        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool).disable_proxy().build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            es_url: es_url.to_string(),
        })
    }

    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Orchestrator running schema work on this cluster.
    ///
    /// Every administration client that must not interleave with another on the same
    /// index has to share the returned orchestrator.
    pub fn schema_orchestrator(&self) -> Arc<dyn WorkOrchestrator> {
        Arc::new(EsWorkOrchestrator::new(self.clone()))
    }

    /// Whether the cluster answers its health endpoint
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Ok(false);
        }
        let body = response.json::<Value>().await?;
        debug!(
            "Cluster '{}' status is '{}'",
            body["cluster_name"].as_str().unwrap_or("unknown"),
            body["status"].as_str().unwrap_or("unknown")
        );
        Ok(true)
    }
}
