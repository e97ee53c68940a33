//! The list pipeline shared by every list page.
//!
//! A page's displayed rows are derived from the raw collection in two steps:
//! the search filter, then a stable sort. Row selection is tracked against
//! the result and reconciled every time it is recomputed.

mod record;
mod search;
mod selection;
mod sort;

pub use record::{Collection, FieldValue, Record, RecordId};
pub use search::apply_search;
pub use selection::SelectionSet;
pub use sort::{SortDirection, SortSpec, apply_sort, toggle_sort};

/// Derive the displayed collection from the raw collection, a search term and
/// a sort.
///
/// This is a pure function of its inputs.
pub fn derive_view(collection: &[Record], term: &str, spec: &SortSpec) -> Collection {
    apply_sort(apply_search(collection, term), spec)
}

#[cfg(test)]
mod derive_view_tests {
    use crate::test_utils::sample_disputes;

    use super::{FieldValue, SortDirection, SortSpec, derive_view};

    #[test]
    fn sorts_sample_disputes_by_amount() {
        let disputes = sample_disputes();

        let derived = derive_view(&disputes, "", &SortSpec::ascending("disputeAmount"));

        let amounts: Vec<_> = derived
            .iter()
            .filter_map(|record| record.get("disputeAmount"))
            .cloned()
            .collect();
        assert_eq!(
            amounts,
            vec![
                FieldValue::Number(50.25),
                FieldValue::Number(100.5),
                FieldValue::Number(200.75)
            ]
        );
    }

    #[test]
    fn filters_before_sorting() {
        let disputes = sample_disputes();

        let derived = derive_view(
            &disputes,
            "needs response",
            &SortSpec::new("created", SortDirection::Ascending),
        );

        let report_ids: Vec<_> = derived
            .iter()
            .filter_map(|record| record.get("reportId"))
            .map(|value| value.to_string())
            .collect();
        assert_eq!(report_ids, vec!["REP003", "REP001"]);
    }

    #[test]
    fn is_deterministic() {
        let disputes = sample_disputes();
        let spec = SortSpec::new("created", SortDirection::Descending);

        let first = derive_view(&disputes, "rep", &spec);
        let second = derive_view(&disputes, "rep", &spec);
        let rederived = derive_view(&first, "rep", &spec);

        assert_eq!(first, second);
        assert_eq!(first, rederived);
    }
}
