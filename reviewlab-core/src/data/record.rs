//! Review records and JSONL parsing.

use crate::data::label::Label;
use crate::error::CoreError;

/// A raw review as read from the input, before labeling.
///
/// Any additional fields present in the source record are dropped at
/// parse time; only `text` and `rating` survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    pub text: String,
    pub rating: i64,
}

/// A review after label derivation and normalization. The rating is
/// consumed by labeling and not carried further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledReview {
    pub label: Label,
    pub text: String,
}

/// Parse a single JSONL record.
///
/// `index` is the zero-based position of the record in its source,
/// carried into errors so callers can point at the offending line.
pub fn parse_record(line: &str, index: usize) -> Result<RawReview, CoreError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| CoreError::MalformedRecord {
            line: index,
            message: e.to_string(),
        })?;

    let text = match value.get("text") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => {
            return Err(CoreError::MissingField {
                field: "text",
                index,
            });
        }
        Some(_) => {
            return Err(CoreError::MalformedRecord {
                line: index,
                message: "field `text` is not a string".to_string(),
            });
        }
    };

    let rating = match value.get("rating") {
        Some(serde_json::Value::Null) | None => {
            return Err(CoreError::MissingField {
                field: "rating",
                index,
            });
        }
        Some(v) => v.as_i64().ok_or_else(|| CoreError::MalformedRecord {
            line: index,
            message: "field `rating` is not an integer".to_string(),
        })?,
    };

    Ok(RawReview { text, rating })
}
