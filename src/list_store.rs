//! Per-session state of the list pages.
//!
//! Each browser session has one [ListState] per resource kind holding the raw
//! collection last fetched from the backend and the view inputs the
//! administrator has chosen. The derived collection is recomputed by every
//! mutator, so it can never be stale with respect to its inputs.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{
    Error,
    pipeline::{Collection, Record, RecordId, SelectionSet, SortSpec, derive_view, toggle_sort},
    session::SessionKey,
    transport::ResourceKind,
};

/// A named subset of a collection, e.g. the disputes that need a response.
#[derive(Clone, Copy)]
pub struct Tab {
    pub slug: &'static str,
    pub label: &'static str,
    pub predicate: fn(&Record) -> bool,
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("slug", &self.slug)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Tab {
    pub fn matches(&self, record: &Record) -> bool {
        (self.predicate)(record)
    }
}

/// The state of one list page for one session.
#[derive(Debug, Clone)]
pub struct ListState {
    id_field: &'static str,
    raw: Collection,
    search: String,
    sort: SortSpec,
    tab: Option<Tab>,
    selection: SelectionSet,
    derived: Collection,
    last_used: Instant,
}

impl ListState {
    /// An empty list whose records are identified by `id_field`.
    pub fn new(id_field: &'static str, sort: SortSpec) -> Self {
        Self {
            id_field,
            raw: Collection::new(),
            search: String::new(),
            sort,
            tab: None,
            selection: SelectionSet::default(),
            derived: Collection::new(),
            last_used: Instant::now(),
        }
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    pub fn raw(&self) -> &[Record] {
        &self.raw
    }

    /// The records to display, in display order.
    pub fn derived(&self) -> &[Record] {
        &self.derived
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn tab(&self) -> Option<&Tab> {
        self.tab.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Find a record in the raw collection.
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.raw
            .iter()
            .find(|record| record.id(self.id_field).as_ref() == Some(id))
    }

    /// Replace the raw collection wholesale, keeping the view inputs.
    pub fn replace_collection(&mut self, collection: Collection) {
        self.raw = collection;
        self.rederive();
    }

    /// Filter by `term` exactly as typed. Only the empty term shows every
    /// record.
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_owned();
        self.rederive();
    }

    /// Sort by `key`, flipping the direction if the list is already sorted
    /// by it.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = toggle_sort(&self.sort, key);
        self.rederive();
    }

    /// Show only the records in `tab`, or every record if `None`.
    pub fn set_tab(&mut self, tab: Option<Tab>) {
        self.tab = tab;
        self.rederive();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.derived, self.id_field);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_all();
    }

    /// Toggle the selection of a displayed record. Records that are not
    /// displayed are ignored.
    pub fn toggle_selected(&mut self, id: RecordId) {
        let is_displayed = self
            .derived
            .iter()
            .any(|record| record.id(self.id_field).as_ref() == Some(&id));

        if is_displayed {
            self.selection.toggle(id);
        }
    }

    /// Apply `update` to the raw record identified by `id`, in place.
    ///
    /// Returns `false` if the record is not in the raw collection.
    pub fn update_record(&mut self, id: &RecordId, update: impl FnOnce(&mut Record)) -> bool {
        let id_field = self.id_field;
        let Some(record) = self
            .raw
            .iter_mut()
            .find(|record| record.id(id_field).as_ref() == Some(id))
        else {
            return false;
        };

        update(record);
        self.rederive();

        true
    }

    fn rederive(&mut self) {
        let in_tab: Collection = match &self.tab {
            Some(tab) => self
                .raw
                .iter()
                .filter(|record| tab.matches(record))
                .cloned()
                .collect(),
            None => self.raw.clone(),
        };

        self.derived = derive_view(&in_tab, &self.search, &self.sort);
        self.selection.reconcile(&self.derived, self.id_field);
    }
}

type ListKey = (SessionKey, ResourceKind);

/// Every session's list state, shared by the request handlers.
///
/// The lock is only held while a closure passed to [ListStore::with_list]
/// runs, never across an `.await`, so concurrent requests for the same list
/// apply in the order they complete.
#[derive(Debug, Clone, Default)]
pub struct ListStore {
    lists: Arc<Mutex<HashMap<ListKey, ListState>>>,
}

impl ListStore {
    /// Run `f` on the list of `kind` for `session`, creating the list with
    /// `init` if the session has not opened it yet.
    ///
    /// # Errors
    /// Returns [Error::ListStoreLock] if the lock is poisoned.
    pub fn with_list<T>(
        &self,
        session: &SessionKey,
        kind: ResourceKind,
        init: impl FnOnce() -> ListState,
        f: impl FnOnce(&mut ListState) -> T,
    ) -> Result<T, Error> {
        let mut lists = self.lists.lock().map_err(|error| {
            tracing::error!("Could not acquire list store lock: {error}");
            Error::ListStoreLock
        })?;

        let list = lists
            .entry((session.clone(), kind))
            .or_insert_with(init);
        list.last_used = Instant::now();

        Ok(f(list))
    }

    /// Discard every list held for `session`.
    pub fn evict_session(&self, session: &SessionKey) -> Result<(), Error> {
        let mut lists = self.lists.lock().map_err(|_| Error::ListStoreLock)?;
        lists.retain(|(key, _), _| key != session);

        Ok(())
    }

    /// Discard lists that have not been used for `max_idle`.
    ///
    /// Returns the number of lists discarded.
    pub fn prune_idle(&self, max_idle: Duration) -> Result<usize, Error> {
        let mut lists = self.lists.lock().map_err(|_| Error::ListStoreLock)?;
        let before = lists.len();
        lists.retain(|_, list| list.last_used.elapsed() < max_idle);

        Ok(before - lists.len())
    }

    /// The number of lists held across every session.
    pub fn len(&self) -> usize {
        self.lists.lock().map(|lists| lists.len()).unwrap_or_default()
    }

    /// Whether no session holds a list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
