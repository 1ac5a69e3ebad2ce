//! Error types for the reviewlab-core crate.

use thiserror::Error;

/// Top-level error type for dataset preparation and service calls.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid rating {rating} at record {index}: expected an integer in 1..=5")]
    InvalidRating { rating: i64, index: usize },

    #[error("record {index} is missing required field `{field}`")]
    MissingField { field: &'static str, index: usize },

    #[error("malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("training job {job_id} failed: {reason}")]
    TrainingFailed { job_id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CoreError {
    pub fn empty_dataset(msg: impl Into<String>) -> Self {
        Self::EmptyDataset(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }
}
