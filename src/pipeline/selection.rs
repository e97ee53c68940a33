//! Row selection keyed by record identifier.
//!
//! Selections are stored as identifiers rather than positions so that sorting
//! or filtering the derived collection can never silently move a selection
//! onto a different record.

use std::collections::BTreeSet;

use super::record::{Record, RecordId};

/// The set of rows the user has marked in a derived collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    /// Select every record in `derived`.
    pub fn select_all(&mut self, derived: &[Record], id_field: &str) {
        self.ids = derived
            .iter()
            .filter_map(|record| record.id(id_field))
            .collect();
    }

    pub fn clear_all(&mut self) {
        self.ids.clear();
    }

    /// Add `id` if it is not selected, otherwise remove it.
    pub fn toggle(&mut self, id: RecordId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Toggle the record at `index` in `derived`. Out of range indices are
    /// ignored.
    pub fn toggle_row(&mut self, derived: &[Record], index: usize, id_field: &str) {
        if let Some(id) = derived.get(index).and_then(|record| record.id(id_field)) {
            self.toggle(id);
        }
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop selections for records that are no longer in `derived`.
    ///
    /// Must be called whenever the derived collection is recomputed.
    pub fn reconcile(&mut self, derived: &[Record], id_field: &str) {
        let visible: BTreeSet<RecordId> = derived
            .iter()
            .filter_map(|record| record.id(id_field))
            .collect();

        self.ids.retain(|id| visible.contains(id));
    }

    /// The positions of the selected records in `derived`.
    pub fn indices(&self, derived: &[Record], id_field: &str) -> Vec<usize> {
        derived
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record
                    .id(id_field)
                    .is_some_and(|id| self.ids.contains(&id))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether every record of a non-empty `derived` collection is selected.
    pub fn is_all_selected(&self, derived: &[Record], id_field: &str) -> bool {
        !derived.is_empty()
            && derived.iter().all(|record| {
                record
                    .id(id_field)
                    .is_some_and(|id| self.ids.contains(&id))
            })
    }
}

#[cfg(test)]
mod selection_tests {
    use crate::{
        pipeline::{RecordId, SortDirection, SortSpec, apply_search, apply_sort},
        test_utils::sample_disputes,
    };

    use super::SelectionSet;

    #[test]
    fn select_all_then_clear() {
        let disputes = sample_disputes();
        let mut selection = SelectionSet::default();

        selection.select_all(&disputes, "id");
        assert_eq!(selection.len(), 3);
        assert!(selection.is_all_selected(&disputes, "id"));

        selection.clear_all();
        assert!(selection.is_empty());
        assert!(!selection.is_all_selected(&disputes, "id"));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionSet::default();

        selection.toggle(RecordId::new("2"));
        assert!(selection.contains(&RecordId::new("2")));

        selection.toggle(RecordId::new("2"));
        assert!(!selection.contains(&RecordId::new("2")));
    }

    #[test]
    fn toggle_row_ignores_out_of_range_index() {
        let disputes = sample_disputes();
        let mut selection = SelectionSet::default();

        selection.toggle_row(&disputes, 7, "id");

        assert!(selection.is_empty());
    }

    #[test]
    fn selection_follows_record_across_sort() {
        let disputes = sample_disputes();
        let mut selection = SelectionSet::default();
        selection.toggle_row(&disputes, 0, "id");

        let sorted = apply_sort(
            disputes,
            &SortSpec::new("disputeAmount", SortDirection::Descending),
        );
        selection.reconcile(&sorted, "id");

        // REP001 (100.50) is in the middle once sorted by amount, descending.
        assert_eq!(selection.indices(&sorted, "id"), vec![1]);
    }

    #[test]
    fn reconcile_keeps_indices_in_range() {
        let disputes = sample_disputes();
        let mut selection = SelectionSet::default();
        selection.select_all(&disputes, "id");

        let filtered = apply_search(&disputes, "555-0303");
        selection.reconcile(&filtered, "id");

        let indices = selection.indices(&filtered, "id");
        assert_eq!(indices, vec![0]);
        assert!(indices.iter().all(|&index| index < filtered.len()));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn empty_collection_is_never_all_selected() {
        let selection = SelectionSet::default();

        assert!(!selection.is_all_selected(&[], "id"));
    }
}
