//! Prediction endpoint client.
//!
//! The endpoint applies the same tokenizer used before training on its
//! side; instances are sent as raw text.

use super::{authorize, check_status, http_client};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One predicted class with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
}

/// Client for a deployed prediction endpoint.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Classify a batch of raw text instances, returning the top `k`
    /// predictions per instance, in input order.
    async fn predict(
        &self,
        endpoint_url: &str,
        instances: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<Prediction>>, CoreError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: &'a [String],
    configuration: PredictConfiguration,
}

#[derive(Serialize)]
struct PredictConfiguration {
    k: usize,
}

/// Per-instance response shape: parallel label/probability arrays.
#[derive(Deserialize)]
struct InstanceResponse {
    label: Vec<String>,
    prob: Vec<f64>,
}

/// HTTP-backed inference client.
pub struct HttpInferenceClient {
    config: ServiceConfig,
    client: reqwest::Client,
}

impl HttpInferenceClient {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(
        &self,
        endpoint_url: &str,
        instances: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<Prediction>>, CoreError> {
        let body = PredictRequest {
            instances,
            configuration: PredictConfiguration { k: top_k },
        };
        let request = authorize(self.client.post(endpoint_url).json(&body), &self.config);
        let response = check_status(request.send().await?).await?;
        let status = response.status().as_u16();
        let raw: Vec<InstanceResponse> = response.json().await?;
        tracing::debug!(
            instances = instances.len(),
            results = raw.len(),
            "batch prediction"
        );
        raw.into_iter()
            .map(|instance| zip_instance(instance, status))
            .collect()
    }
}

fn zip_instance(instance: InstanceResponse, status: u16) -> Result<Vec<Prediction>, CoreError> {
    if instance.label.len() != instance.prob.len() {
        return Err(CoreError::service(
            status,
            format!(
                "mismatched prediction arrays: {} labels, {} probabilities",
                instance.label.len(),
                instance.prob.len()
            ),
        ));
    }
    Ok(instance
        .label
        .into_iter()
        .zip(instance.prob)
        .map(|(label, probability)| Prediction { label, probability })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parallel_arrays_are_zipped() {
        let raw = InstanceResponse {
            label: vec!["__label__3".to_string(), "__label__2".to_string()],
            prob: vec![0.91, 0.07],
        };
        let predictions = zip_instance(raw, 200).unwrap();
        assert_eq!(
            predictions,
            vec![
                Prediction {
                    label: "__label__3".to_string(),
                    probability: 0.91
                },
                Prediction {
                    label: "__label__2".to_string(),
                    probability: 0.07
                },
            ]
        );
    }

    #[test]
    fn test_mismatched_arrays_are_a_service_error() {
        let raw = InstanceResponse {
            label: vec!["__label__1".to_string()],
            prob: vec![0.5, 0.4],
        };
        let err = zip_instance(raw, 200).unwrap_err();
        assert!(matches!(err, CoreError::Service { status: 200, .. }));
    }
}
