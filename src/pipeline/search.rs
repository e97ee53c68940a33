//! Full-row, case-insensitive text search.

use super::record::{Collection, Record};

/// Keep the records where any field value, rendered as text, contains `term`
/// ignoring case.
///
/// An empty `term` keeps every record.
pub fn apply_search(collection: &[Record], term: &str) -> Collection {
    if term.is_empty() {
        return collection.to_vec();
    }

    let needle = term.to_lowercase();

    collection
        .iter()
        .filter(|record| contains_lowercase(record, &needle))
        .cloned()
        .collect()
}

fn contains_lowercase(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.to_string().to_lowercase().contains(needle))
}

#[cfg(test)]
mod search_tests {
    use crate::{
        pipeline::{FieldValue, Record, RecordId},
        test_utils::sample_disputes,
    };

    use super::apply_search;

    #[test]
    fn empty_term_is_identity() {
        let disputes = sample_disputes();

        assert_eq!(apply_search(&disputes, ""), disputes);
    }

    #[test]
    fn finds_dispute_by_reporter_phone() {
        let disputes = sample_disputes();

        let got = apply_search(&disputes, "555-0303");

        assert_eq!(got.len(), 1, "want exactly one match, got {got:?}");
        assert_eq!(
            got[0].get("reportId"),
            Some(&FieldValue::Text("REP003".to_owned()))
        );
    }

    #[test]
    fn ignores_case() {
        let disputes = sample_disputes();

        let got = apply_search(&disputes, "rep2@EXAMPLE.com");

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id("id"), Some(RecordId::new("2")));
    }

    #[test]
    fn matches_numbers_booleans_and_dates_as_text() {
        let disputes = sample_disputes();

        assert_eq!(apply_search(&disputes, "200.75").len(), 1);
        assert_eq!(apply_search(&disputes, "2024-11").len(), 2);
        // Every sample dispute has at least one `false` flag except REP003.
        assert_eq!(apply_search(&disputes, "false").len(), 2);
    }

    #[test]
    fn every_match_contains_the_term() {
        let disputes = sample_disputes();

        for term in ["rep", "555", "in review", "0.5", "TRUE", "zzz"] {
            for record in apply_search(&disputes, term) {
                let contains = record
                    .values()
                    .any(|value| value.to_string().to_lowercase().contains(&term.to_lowercase()));

                assert!(contains, "{record:?} does not contain {term:?}");
            }
        }
    }

    #[test]
    fn null_fields_never_match() {
        let records = vec![Record::from_iter([("email", FieldValue::Null)])];

        assert!(apply_search(&records, "null").is_empty());
        assert_eq!(apply_search(&records, "").len(), 1);
    }

    #[test]
    fn preserves_input_order() {
        let disputes = sample_disputes();

        let ids: Vec<_> = apply_search(&disputes, "REP")
            .iter()
            .filter_map(|record| record.id("id"))
            .collect();

        assert_eq!(
            ids,
            vec![RecordId::new("1"), RecordId::new("2"), RecordId::new("3")]
        );
    }
}
