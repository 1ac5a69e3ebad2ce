//! Clients for the managed-service collaborators: dataset storage,
//! training, hosting, and inference. Each client is constructed from an
//! explicit [`ServiceConfig`](crate::config::ServiceConfig) and owns its
//! own HTTP client.

pub mod hosting;
pub mod inference;
pub mod storage;
pub mod training;

pub use hosting::{DeploymentConfig, Endpoint, HostingClient, HttpHostingClient};
pub use inference::{HttpInferenceClient, InferenceClient, Prediction};
pub use storage::{DatasetLocation, DatasetStore, HttpDatasetStore};
pub use training::{
    HttpTrainingClient, Hyperparameters, TrainingClient, TrainingJob, TrainingStatus,
};

use crate::config::ServiceConfig;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named destination grouping for uploaded data, consumed by the
/// training service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Train,
    Validation,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Train => "train",
            Channel::Validation => "validation",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a reqwest client with the configured timeout.
pub(crate) fn http_client(config: &ServiceConfig) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(CoreError::from)
}

/// Attach the configured bearer token, if any.
pub(crate) fn authorize(
    request: reqwest::RequestBuilder,
    config: &ServiceConfig,
) -> reqwest::RequestBuilder {
    match &config.api_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Map non-2xx responses to [`CoreError::Service`] with the body as the
/// message.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CoreError::service(status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_wire_names() {
        assert_eq!(Channel::Train.as_str(), "train");
        assert_eq!(Channel::Validation.as_str(), "validation");
        assert_eq!(
            serde_json::to_string(&Channel::Validation).unwrap(),
            "\"validation\""
        );
    }
}
