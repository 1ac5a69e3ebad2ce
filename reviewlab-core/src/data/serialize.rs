//! Serialization of labeled reviews to the training service's flat
//! text format: one `__label__<class> <text>` line per record.

use crate::data::record::LabeledReview;
use std::io::Write;

/// Write records as whitespace-delimited label/text lines, preserving
/// order. No header row is emitted.
pub fn write_labeled<W: Write>(records: &[LabeledReview], writer: &mut W) -> std::io::Result<()> {
    for record in records {
        writeln!(writer, "{} {}", record.label.token(), record.text)?;
    }
    Ok(())
}

/// Convenience wrapper returning the serialized form as a string.
pub fn to_labeled_string(records: &[LabeledReview]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.label.token());
        out.push(' ');
        out.push_str(&record.text);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::label::{NEGATIVE, POSITIVE};
    use pretty_assertions::assert_eq;

    fn labeled(label: crate::data::label::Label, text: &str) -> LabeledReview {
        LabeledReview {
            label,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_line_format() {
        let records = vec![
            labeled(NEGATIVE, "bad item"),
            labeled(POSITIVE, "great buy"),
        ];
        assert_eq!(
            to_labeled_string(&records),
            "__label__1 bad item\n__label__3 great buy\n"
        );
    }

    #[test]
    fn test_empty_slice_writes_nothing() {
        assert_eq!(to_labeled_string(&[]), "");
    }

    #[test]
    fn test_order_is_preserved() {
        let records: Vec<LabeledReview> = (0..10)
            .map(|i| labeled(POSITIVE, &format!("review {i}")))
            .collect();
        let out = to_labeled_string(&records);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "__label__3 review 0");
        assert_eq!(lines[9], "__label__3 review 9");
    }
}
