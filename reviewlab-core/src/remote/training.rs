//! Training service client and job tracking.

use super::{authorize, check_status, http_client};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::remote::storage::DatasetLocation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hyperparameters for a supervised text-classification run, sent to
/// the service as a flat map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparameters {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_vector_dim")]
    pub vector_dim: u32,
    #[serde(default = "default_true")]
    pub early_stopping: bool,
    #[serde(default = "default_patience")]
    pub patience: u32,
    #[serde(default = "default_min_epochs")]
    pub min_epochs: u32,
    #[serde(default = "default_word_ngrams")]
    pub word_ngrams: u32,
}

fn default_mode() -> String {
    "supervised".to_string()
}
fn default_epochs() -> u32 {
    10
}
fn default_learning_rate() -> f64 {
    0.05
}
fn default_vector_dim() -> u32 {
    10
}
fn default_true() -> bool {
    true
}
fn default_patience() -> u32 {
    4
}
fn default_min_epochs() -> u32 {
    5
}
fn default_word_ngrams() -> u32 {
    2
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            vector_dim: default_vector_dim(),
            early_stopping: true,
            patience: default_patience(),
            min_epochs: default_min_epochs(),
            word_ngrams: default_word_ngrams(),
        }
    }
}

/// Training job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl TrainingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }
}

/// A training job as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJob {
    pub id: String,
    pub status: TrainingStatus,
    /// Location of the trained model artifact, set once the job
    /// completes.
    #[serde(default)]
    pub artifact_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client for the managed training service.
#[async_trait]
pub trait TrainingClient: Send + Sync {
    /// Start a training job over the two uploaded dataset channels.
    async fn start(
        &self,
        train: &DatasetLocation,
        validation: &DatasetLocation,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingJob, CoreError>;

    /// Fetch the current state of a job.
    async fn status(&self, job_id: &str) -> Result<TrainingJob, CoreError>;

    /// Poll a job until it reaches a terminal state. Completion returns
    /// the final job record; failure or a stop becomes an error.
    async fn wait(&self, job_id: &str, poll_interval: Duration) -> Result<TrainingJob, CoreError> {
        loop {
            let job = self.status(job_id).await?;
            match job.status {
                TrainingStatus::Completed => {
                    tracing::info!(job_id, artifact = ?job.artifact_uri, "training completed");
                    return Ok(job);
                }
                TrainingStatus::Failed | TrainingStatus::Stopped => {
                    return Err(CoreError::TrainingFailed {
                        job_id: job_id.to_string(),
                        reason: format!("job ended with status {:?}", job.status),
                    });
                }
                TrainingStatus::Pending | TrainingStatus::Running => {
                    tracing::info!(job_id, status = ?job.status, "training in progress");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct StartJobRequest<'a> {
    train: &'a str,
    validation: &'a str,
    hyperparameters: &'a Hyperparameters,
}

/// HTTP-backed training client.
pub struct HttpTrainingClient {
    config: ServiceConfig,
    client: reqwest::Client,
}

impl HttpTrainingClient {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TrainingClient for HttpTrainingClient {
    async fn start(
        &self,
        train: &DatasetLocation,
        validation: &DatasetLocation,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingJob, CoreError> {
        let url = format!("{}/training/jobs", self.config.endpoint);
        let body = StartJobRequest {
            train: &train.uri,
            validation: &validation.uri,
            hyperparameters,
        };
        let request = authorize(self.client.post(&url).json(&body), &self.config);
        let response = check_status(request.send().await?).await?;
        let job: TrainingJob = response.json().await?;
        tracing::info!(job_id = %job.id, "training job started");
        Ok(job)
    }

    async fn status(&self, job_id: &str) -> Result<TrainingJob, CoreError> {
        let url = format!("{}/training/jobs/{job_id}", self.config.endpoint);
        let request = authorize(self.client.get(&url), &self.config);
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}
