//! Dataset preparation: labeling, normalization, shuffling, splitting.

pub mod label;
pub mod pipeline;
pub mod record;
pub mod serialize;

pub use label::{Label, LabelMapping, SentimentMapping, LABEL_PREFIX};
pub use pipeline::{PrepareOptions, PreparedDataset, SkippedRecord, ValidationMode};
pub use record::{LabeledReview, RawReview};
