//! The filtered view synchronizer.
//!
//! [`FilteredView<T>`] is the engine-owned, host-observable projection of the
//! source collection: the ordered subset of items that pass the current
//! search predicate. Hosts render the drop-down from this view and track it
//! through the row signals rather than by diffing snapshots.
//!
//! Reconciliation is a single forward pass over the source with a cursor into
//! the view. It touches only the rows that actually change, so a one-item
//! source edit costs a constant number of structural edits, not a rebuild.

use parking_lot::RwLock;

use horizon_suggest_core::Signal;

use crate::filter::{Formatter, SearchPredicate};

/// Row-range notifications emitted by [`FilteredView`].
///
/// Each structural change is announced twice: an `about_to` signal before the
/// storage mutates (the view still shows the old rows) and a companion signal
/// after. Payloads are inclusive `(first, last)` row ranges.
#[derive(Default)]
pub struct ViewSignals {
    /// Rows `first..=last` are about to be inserted.
    pub rows_about_to_be_inserted: Signal<(usize, usize)>,
    /// Rows `first..=last` were inserted.
    pub rows_inserted: Signal<(usize, usize)>,
    /// Rows `first..=last` are about to be removed.
    pub rows_about_to_be_removed: Signal<(usize, usize)>,
    /// Rows `first..=last` were removed.
    pub rows_removed: Signal<(usize, usize)>,
    /// The entire view is about to be replaced.
    pub view_about_to_reset: Signal<()>,
    /// The entire view was replaced.
    pub view_reset: Signal<()>,
}

/// An observable, ordered projection of the source collection.
///
/// The view stores clones of the matching items in source order. Item
/// identity during reconciliation is the item's own `PartialEq`.
pub struct FilteredView<T> {
    items: RwLock<Vec<T>>,
    signals: ViewSignals,
}

impl<T: Clone + PartialEq> Default for FilteredView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> FilteredView<T> {
    /// Create an empty view.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            signals: ViewSignals::default(),
        }
    }

    /// The view's change-notification signals.
    pub fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    /// Number of rows currently in the view.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A clone of the row at `index`, if present.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// A clone of the first row, if present.
    pub fn first(&self) -> Option<T> {
        self.items.read().first().cloned()
    }

    /// A snapshot of every row.
    pub fn items(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// The row index of the first item equal to `item`, if present.
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items.read().iter().position(|row| row == item)
    }

    /// Remove every row, announced as a wholesale reset.
    pub fn clear(&self) {
        if self.items.read().is_empty() {
            return;
        }
        self.signals.view_about_to_reset.emit(());
        self.items.write().clear();
        self.signals.view_reset.emit(());
        tracing::debug!(target: "horizon_suggest::view", "view cleared");
    }

    /// Synchronize the view with `source` under the given predicate.
    ///
    /// A single forward pass over the source keeps matching items, replaces
    /// mismatched rows at the cursor, appends new matches at the end, and
    /// removes rows whose item no longer matches. After the pass any rows
    /// beyond the cursor are removed, so on return the view is exactly the
    /// matching subset of the source, in source order.
    ///
    /// An absent or empty source clears the view. Returns the resulting row
    /// count.
    pub fn reconcile(
        &self,
        source: Option<&[T]>,
        search_text: &str,
        predicate: &SearchPredicate<T>,
        format: &Formatter<T>,
    ) -> usize {
        let source = match source {
            Some(items) if !items.is_empty() => items,
            _ => {
                self.clear();
                return 0;
            }
        };

        let mut cursor = 0usize;
        for item in source {
            let row = self.items.read().get(cursor).cloned();
            if predicate.matches(search_text, item, format) {
                match row {
                    Some(ref existing) if existing == item => {
                        cursor += 1;
                    }
                    Some(_) => {
                        // A different item sits at the cursor. Replace it so
                        // hosts see a remove and an insert, not a silent
                        // in-place change.
                        self.remove_rows(cursor, cursor);
                        self.insert_row(cursor, item.clone());
                        cursor += 1;
                    }
                    None => {
                        self.insert_row(cursor, item.clone());
                        cursor += 1;
                    }
                }
            } else if matches!(row, Some(ref existing) if existing == item) {
                // The item was in the view but no longer matches.
                self.remove_rows(cursor, cursor);
            }
        }

        // Rows past the cursor correspond to nothing in the source pass.
        let len = self.items.read().len();
        if cursor < len {
            self.remove_rows(cursor, len - 1);
        }

        let count = self.items.read().len();
        tracing::debug!(
            target: "horizon_suggest::view",
            rows = count,
            search_text,
            "view reconciled"
        );
        count
    }

    /// Remove a single row, with the usual signal pair.
    pub(crate) fn remove_row(&self, index: usize) {
        self.remove_rows(index, index);
    }

    fn insert_row(&self, index: usize, item: T) {
        self.signals.rows_about_to_be_inserted.emit((index, index));
        self.items.write().insert(index, item);
        self.signals.rows_inserted.emit((index, index));
    }

    fn remove_rows(&self, first: usize, last: usize) {
        self.signals.rows_about_to_be_removed.emit((first, last));
        self.items.write().drain(first..=last);
        self.signals.rows_removed.emit((first, last));
    }
}
