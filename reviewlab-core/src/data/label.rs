//! Label taxonomy — mapping star ratings to categorical classes.

/// Prefix shared by all serialized label tokens, e.g. `__label__1`.
pub const LABEL_PREFIX: &str = "__label__";

/// A categorical class assigned to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// 1-based class index used in the serialized token.
    pub class_index: u8,
    /// Human-readable class name.
    pub name: &'static str,
}

impl Label {
    /// The serialized form consumed by the training service,
    /// e.g. `__label__2` for the neutral class.
    pub fn token(&self) -> String {
        format!("{LABEL_PREFIX}{}", self.class_index)
    }
}

/// A total mapping from rating values to labels.
///
/// Returns `None` for ratings outside the mapping's domain; the pipeline
/// turns that into an [`crate::error::CoreError::InvalidRating`].
pub trait LabelMapping: Send + Sync {
    fn label_for(&self, rating: i64) -> Option<Label>;
}

/// The default three-class sentiment taxonomy over 1-5 star ratings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentMapping;

pub const NEGATIVE: Label = Label {
    class_index: 1,
    name: "negative",
};
pub const NEUTRAL: Label = Label {
    class_index: 2,
    name: "neutral",
};
pub const POSITIVE: Label = Label {
    class_index: 3,
    name: "positive",
};

impl LabelMapping for SentimentMapping {
    fn label_for(&self, rating: i64) -> Option<Label> {
        match rating {
            1 | 2 => Some(NEGATIVE),
            3 | 4 => Some(NEUTRAL),
            5 => Some(POSITIVE),
            _ => None,
        }
    }
}
