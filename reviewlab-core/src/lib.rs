//! # reviewlab-core — review-dataset preparation & managed-service clients
//!
//! This crate provides the reproducible part of the reviewlab workflow:
//! deriving sentiment labels from star ratings, normalizing and shuffling
//! the records, and splitting them into training/validation files in the
//! flat `__label__<class> <text>` format the managed text-classification
//! service consumes. It also provides thin typed clients for the service's
//! four surfaces: dataset storage, training, hosting, and inference.
//!
//! The pipeline is a pure, single-pass transformation —
//! validate, label, normalize, shuffle, split, serialize — over an
//! in-memory batch. All randomness is injected through an explicit seed so
//! runs can be made reproducible.

pub mod config;
pub mod data;
pub mod error;
pub mod remote;

pub use config::{AppConfig, ServiceConfig};
pub use data::{
    LabeledReview, PrepareOptions, PreparedDataset, RawReview, SentimentMapping, ValidationMode,
};
pub use error::CoreError;
