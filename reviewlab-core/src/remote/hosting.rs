//! Hosting service client — turning a trained artifact into an
//! invocable prediction endpoint.

use super::{authorize, check_status, http_client};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sizing for a deployed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    #[serde(default = "default_instance_count")]
    pub instance_count: u32,
}

fn default_instance_type() -> String {
    "standard-1".to_string()
}
fn default_instance_count() -> u32 {
    1
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            instance_type: default_instance_type(),
            instance_count: default_instance_count(),
        }
    }
}

/// A deployed prediction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
}

/// Client for the managed hosting service.
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Deploy a trained artifact behind a prediction endpoint.
    async fn deploy(
        &self,
        artifact_uri: &str,
        config: &DeploymentConfig,
    ) -> Result<Endpoint, CoreError>;

    /// Tear an endpoint down.
    async fn delete(&self, name: &str) -> Result<(), CoreError>;
}

#[derive(Serialize)]
struct DeployRequest<'a> {
    artifact: &'a str,
    instance_type: &'a str,
    instance_count: u32,
}

/// HTTP-backed hosting client.
pub struct HttpHostingClient {
    config: ServiceConfig,
    client: reqwest::Client,
}

impl HttpHostingClient {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl HostingClient for HttpHostingClient {
    async fn deploy(
        &self,
        artifact_uri: &str,
        deployment: &DeploymentConfig,
    ) -> Result<Endpoint, CoreError> {
        let url = format!("{}/endpoints", self.config.endpoint);
        let body = DeployRequest {
            artifact: artifact_uri,
            instance_type: &deployment.instance_type,
            instance_count: deployment.instance_count,
        };
        let request = authorize(self.client.post(&url).json(&body), &self.config);
        let response = check_status(request.send().await?).await?;
        let endpoint: Endpoint = response.json().await?;
        tracing::info!(name = %endpoint.name, url = %endpoint.url, "endpoint deployed");
        Ok(endpoint)
    }

    async fn delete(&self, name: &str) -> Result<(), CoreError> {
        let url = format!("{}/endpoints/{name}", self.config.endpoint);
        let request = authorize(self.client.delete(&url), &self.config);
        check_status(request.send().await?).await?;
        tracing::info!(name, "endpoint deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_defaults() {
        let config = DeploymentConfig::default();
        assert_eq!(config.instance_type, "standard-1");
        assert_eq!(config.instance_count, 1);
    }
}
