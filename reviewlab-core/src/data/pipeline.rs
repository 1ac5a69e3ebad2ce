//! The preparation pipeline: validate, label, normalize, shuffle, split.

use crate::data::label::LabelMapping;
use crate::data::record::{self, LabeledReview, RawReview};
use crate::error::CoreError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Policy for records that fail validation or labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Abort the whole batch on the first bad record.
    #[default]
    FailFast,
    /// Skip bad records, log each one, and report them in the outcome.
    CollectAndReport,
}

/// Options controlling the preparation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareOptions {
    /// Fraction of the shuffled dataset allocated to training.
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    /// Shuffle seed. When unset the shuffle is seeded from entropy and
    /// runs are not reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Whether to shuffle before splitting. Disabling keeps input order,
    /// which fixed-order fixtures rely on.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// What to do with records that fail validation or labeling.
    #[serde(default)]
    pub on_invalid: ValidationMode,
    /// When false, a split that leaves either subset empty is an error.
    #[serde(default = "default_true")]
    pub allow_empty_split: bool,
}

fn default_split_ratio() -> f64 {
    0.9
}
fn default_true() -> bool {
    true
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            split_ratio: default_split_ratio(),
            seed: None,
            shuffle: true,
            on_invalid: ValidationMode::default(),
            allow_empty_split: true,
        }
    }
}

/// A record rejected under [`ValidationMode::CollectAndReport`].
#[derive(Debug)]
pub struct SkippedRecord {
    pub index: usize,
    pub error: CoreError,
}

/// The outcome of a preparation run: two disjoint subsets whose union is
/// the shuffled input, plus any records skipped along the way.
#[derive(Debug, Default)]
pub struct PreparedDataset {
    pub train: Vec<LabeledReview>,
    pub validation: Vec<LabeledReview>,
    pub skipped: Vec<SkippedRecord>,
}

impl PreparedDataset {
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len()
    }
}

/// Run the full pipeline over already-parsed records.
pub fn prepare_records(
    records: Vec<RawReview>,
    mapping: &dyn LabelMapping,
    options: &PrepareOptions,
) -> Result<PreparedDataset, CoreError> {
    validate_ratio(options.split_ratio)?;
    if records.is_empty() {
        return Err(CoreError::empty_dataset("no input records"));
    }

    let mut labeled = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match label_record(record, index, mapping) {
            Ok(r) => labeled.push(r),
            Err(error) => reject(error, index, options.on_invalid, &mut skipped)?,
        }
    }

    finish(labeled, skipped, options)
}

/// Run the full pipeline over JSONL input, parsing line by line so the
/// skip policy also covers malformed and incomplete records.
pub fn prepare_jsonl<R: BufRead>(
    reader: R,
    mapping: &dyn LabelMapping,
    options: &PrepareOptions,
) -> Result<PreparedDataset, CoreError> {
    validate_ratio(options.split_ratio)?;

    let mut labeled = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        seen += 1;
        match record::parse_record(&line, index)
            .and_then(|r| label_record(r, index, mapping))
        {
            Ok(r) => labeled.push(r),
            Err(error) => reject(error, index, options.on_invalid, &mut skipped)?,
        }
    }

    if seen == 0 {
        return Err(CoreError::empty_dataset("no input records"));
    }
    finish(labeled, skipped, options)
}

/// Label and normalize one record. The rating is consumed here; the text
/// is lowercased and embedded line breaks become spaces so each record
/// serializes to exactly one output line.
fn label_record(
    record: RawReview,
    index: usize,
    mapping: &dyn LabelMapping,
) -> Result<LabeledReview, CoreError> {
    let label = mapping
        .label_for(record.rating)
        .ok_or(CoreError::InvalidRating {
            rating: record.rating,
            index,
        })?;
    Ok(LabeledReview {
        label,
        text: normalize_text(&record.text),
    })
}

/// Lowercase and flatten line breaks. JSONL escaping keeps raw newlines
/// out of the input lines, but the parsed string can still contain `\n`
/// from `\\n` escapes, which would break the one-record-per-line output.
fn normalize_text(text: &str) -> String {
    text.to_lowercase().replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn reject(
    error: CoreError,
    index: usize,
    mode: ValidationMode,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<(), CoreError> {
    match mode {
        ValidationMode::FailFast => Err(error),
        ValidationMode::CollectAndReport => {
            tracing::warn!(index, %error, "skipping record");
            skipped.push(SkippedRecord { index, error });
            Ok(())
        }
    }
}

fn validate_ratio(ratio: f64) -> Result<(), CoreError> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(CoreError::config(format!(
            "split_ratio must be in (0, 1), got {ratio}"
        )));
    }
    Ok(())
}

/// Shuffle and split the labeled records.
fn finish(
    mut labeled: Vec<LabeledReview>,
    skipped: Vec<SkippedRecord>,
    options: &PrepareOptions,
) -> Result<PreparedDataset, CoreError> {
    if labeled.is_empty() {
        return Err(CoreError::empty_dataset(format!(
            "all records were rejected ({} skipped)",
            skipped.len()
        )));
    }

    if options.shuffle {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        labeled.shuffle(&mut rng);
    }

    let total = labeled.len();
    let train_len = ((total as f64) * options.split_ratio).round() as usize;
    let train_len = train_len.min(total);
    let validation = labeled.split_off(train_len);
    let train = labeled;

    if !options.allow_empty_split && (train.is_empty() || validation.is_empty()) {
        return Err(CoreError::empty_dataset(format!(
            "split_ratio {} over {} records leaves a subset empty",
            options.split_ratio, total
        )));
    }

    tracing::debug!(
        train = train.len(),
        validation = validation.len(),
        skipped = skipped.len(),
        "dataset split"
    );

    Ok(PreparedDataset {
        train,
        validation,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::label::SentimentMapping;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn review(text: &str, rating: i64) -> RawReview {
        RawReview {
            text: text.to_string(),
            rating,
        }
    }

    fn ordered_options(ratio: f64) -> PrepareOptions {
        PrepareOptions {
            split_ratio: ratio,
            shuffle: false,
            ..PrepareOptions::default()
        }
    }

    #[test]
    fn test_worked_example_without_shuffle() {
        // Three records, ratio 0.67, input order preserved.
        let records = vec![
            review("Bad Item", 1),
            review("Great Buy", 5),
            review("OK Product", 3),
        ];
        let out = prepare_records(records, &SentimentMapping, &ordered_options(0.67)).unwrap();

        let rows: Vec<(String, &str)> = out
            .train
            .iter()
            .chain(out.validation.iter())
            .map(|r| (r.label.token(), r.text.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("__label__1".to_string(), "bad item"),
                ("__label__3".to_string(), "great buy"),
                ("__label__2".to_string(), "ok product"),
            ]
        );
        assert_eq!(out.train.len(), 2);
        assert_eq!(out.validation.len(), 1);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err =
            prepare_records(Vec::new(), &SentimentMapping, &PrepareOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyDataset(_)));
    }

    #[test]
    fn test_fail_fast_aborts_on_invalid_rating() {
        let records = vec![review("fine", 4), review("broken", 9), review("good", 5)];
        let err = prepare_records(records, &SentimentMapping, &ordered_options(0.9)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidRating {
                rating: 9,
                index: 1
            }
        ));
    }

    #[test]
    fn test_collect_and_report_skips_and_reports() {
        let records = vec![review("fine", 4), review("broken", 0), review("good", 5)];
        let options = PrepareOptions {
            on_invalid: ValidationMode::CollectAndReport,
            ..ordered_options(0.5)
        };
        let out = prepare_records(records, &SentimentMapping, &options).unwrap();
        assert_eq!(out.total(), 2);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].index, 1);
        assert!(matches!(
            out.skipped[0].error,
            CoreError::InvalidRating { rating: 0, .. }
        ));
    }

    #[test]
    fn test_all_records_rejected_is_empty_dataset() {
        let records = vec![review("a", 0), review("b", 7)];
        let options = PrepareOptions {
            on_invalid: ValidationMode::CollectAndReport,
            ..PrepareOptions::default()
        };
        let err = prepare_records(records, &SentimentMapping, &options).unwrap_err();
        assert!(matches!(err, CoreError::EmptyDataset(_)));
    }

    #[test]
    fn test_deterministic_given_seed() {
        let make = || -> Vec<RawReview> {
            (0..100)
                .map(|i| review(&format!("Review Number {i}"), (i % 5) + 1))
                .collect()
        };
        let options = PrepareOptions {
            seed: Some(42),
            split_ratio: 0.8,
            ..PrepareOptions::default()
        };
        let a = prepare_records(make(), &SentimentMapping, &options).unwrap();
        let b = prepare_records(make(), &SentimentMapping, &options).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.validation, b.validation);
    }

    #[test]
    fn test_different_seeds_usually_differ() {
        let make = || -> Vec<RawReview> {
            (0..100)
                .map(|i| review(&format!("review {i}"), (i % 5) + 1))
                .collect()
        };
        let opts = |seed| PrepareOptions {
            seed: Some(seed),
            ..PrepareOptions::default()
        };
        let a = prepare_records(make(), &SentimentMapping, &opts(1)).unwrap();
        let b = prepare_records(make(), &SentimentMapping, &opts(2)).unwrap();
        assert_ne!(a.train, b.train);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = label_record(review("MiXeD Case", 5), 0, &SentimentMapping).unwrap();
        let twice = label_record(
            RawReview {
                text: once.text.clone(),
                rating: 5,
            },
            0,
            &SentimentMapping,
        )
        .unwrap();
        assert_eq!(once.text, twice.text);
        assert_eq!(once.text, "mixed case");
    }

    #[test]
    fn test_line_breaks_become_spaces() {
        let record = label_record(review("Line One\nLine Two", 5), 0, &SentimentMapping).unwrap();
        assert_eq!(record.text, "line one line two");

        let crlf = label_record(review("Top\r\nBottom\rEnd", 3), 0, &SentimentMapping).unwrap();
        assert_eq!(crlf.text, "top bottom end");
    }

    #[test]
    fn test_single_record_with_empty_split_allowed() {
        let out = prepare_records(
            vec![review("only one", 5)],
            &SentimentMapping,
            &ordered_options(0.9),
        )
        .unwrap();
        assert_eq!(out.train.len(), 1);
        assert!(out.validation.is_empty());
    }

    #[test]
    fn test_single_record_with_empty_split_denied() {
        let options = PrepareOptions {
            allow_empty_split: false,
            ..ordered_options(0.9)
        };
        let err =
            prepare_records(vec![review("only one", 5)], &SentimentMapping, &options).unwrap_err();
        assert!(matches!(err, CoreError::EmptyDataset(_)));
    }

    #[test]
    fn test_ratio_out_of_range_is_a_config_error() {
        for ratio in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let err = prepare_records(
                vec![review("x", 3)],
                &SentimentMapping,
                &ordered_options(ratio),
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::Config(_)), "ratio {ratio}");
        }
    }

    #[test]
    fn test_prepare_jsonl_end_to_end() {
        let input = concat!(
            "{\"text\": \"Bad Item\", \"rating\": 1}\n",
            "\n",
            "{\"text\": \"Great Buy\", \"rating\": 5}\n",
            "not json at all\n",
            "{\"text\": \"OK Product\", \"rating\": 3}\n",
        );
        let options = PrepareOptions {
            on_invalid: ValidationMode::CollectAndReport,
            ..ordered_options(0.67)
        };
        let out = prepare_jsonl(input.as_bytes(), &SentimentMapping, &options).unwrap();
        assert_eq!(out.total(), 3);
        assert_eq!(out.skipped.len(), 1);
        // Blank lines are skipped but still counted in line numbering.
        assert_eq!(out.skipped[0].index, 3);
    }

    #[test]
    fn test_prepare_jsonl_empty_input() {
        let err = prepare_jsonl(
            "\n\n".as_bytes(),
            &SentimentMapping,
            &PrepareOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyDataset(_)));
    }

    proptest! {
        #[test]
        fn prop_split_sizes_and_content(
            texts in proptest::collection::vec("[a-z ]{1,20}", 1..200),
            ratio in 0.01f64..0.99,
            seed in any::<u64>(),
        ) {
            let records: Vec<RawReview> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| review(t, (i as i64 % 5) + 1))
                .collect();
            let n = records.len();
            let options = PrepareOptions {
                split_ratio: ratio,
                seed: Some(seed),
                ..PrepareOptions::default()
            };
            let out = prepare_records(records.clone(), &SentimentMapping, &options).unwrap();

            // Sizes: |train| = round(r * N), |train| + |val| = N.
            prop_assert_eq!(out.train.len(), ((n as f64) * ratio).round() as usize);
            prop_assert_eq!(out.train.len() + out.validation.len(), n);

            // Union as a multiset equals the labeled input.
            let mut got: Vec<String> = out
                .train
                .iter()
                .chain(out.validation.iter())
                .map(|r| format!("{} {}", r.label.token(), r.text))
                .collect();
            got.sort();
            let mut expected: Vec<String> = records
                .iter()
                .map(|r| {
                    let labeled =
                        label_record(r.clone(), 0, &SentimentMapping).unwrap();
                    format!("{} {}", labeled.label.token(), labeled.text)
                })
                .collect();
            expected.sort();
            prop_assert_eq!(got, expected);
        }
    }
}
