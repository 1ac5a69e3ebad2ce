//! Remote dataset storage client.

use super::{authorize, check_status, http_client, Channel};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Addressable location of an uploaded dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetLocation {
    pub channel: Channel,
    pub uri: String,
}

/// Storage that accepts named byte streams and returns their
/// addressable locations.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn upload(
        &self,
        channel: Channel,
        name: &str,
        body: Vec<u8>,
    ) -> Result<DatasetLocation, CoreError>;
}

/// HTTP-backed dataset store.
pub struct HttpDatasetStore {
    config: ServiceConfig,
    client: reqwest::Client,
}

impl HttpDatasetStore {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    uri: String,
}

#[async_trait]
impl DatasetStore for HttpDatasetStore {
    async fn upload(
        &self,
        channel: Channel,
        name: &str,
        body: Vec<u8>,
    ) -> Result<DatasetLocation, CoreError> {
        let url = format!("{}/datasets/{}/{}", self.config.endpoint, channel, name);
        let bytes = body.len();
        let request = authorize(self.client.put(&url).body(body), &self.config);
        let response = check_status(request.send().await?).await?;
        let parsed: UploadResponse = response.json().await?;
        tracing::info!(%channel, name, bytes, uri = %parsed.uri, "dataset uploaded");
        Ok(DatasetLocation {
            channel,
            uri: parsed.uri,
        })
    }
}
