//! The suggestion engine.
//!
//! [`SuggestEngine<T>`] ties the predicate library, the filtered view, the
//! completion reconciler and the placement solver together behind the
//! host-facing seam: typed setters in, signals out.
//!
//! # Threading and time
//!
//! The engine is single-threaded and cooperative. The host owns the clock:
//! text edits carry the current `Instant`, and [`tick`](SuggestEngine::tick)
//! drives the populate debounce. Nothing here spawns threads or blocks.
//!
//! # Caret reporting
//!
//! Hosts report the post-edit caret via [`set_caret`](SuggestEngine::set_caret)
//! *before* the matching [`set_text`](SuggestEngine::set_text) call, the same
//! order a text widget fires its events in. Inline completion uses the caret
//! to tell forward typing from deletion and mid-string edits.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use horizon_suggest::SuggestEngine;
//!
//! let mut engine: SuggestEngine<String> = SuggestEngine::new();
//! engine.set_source(Some(vec!["apple".into(), "apricot".into(), "banana".into()]));
//!
//! engine.set_caret(2, 0);
//! engine.set_text("ap", true, Instant::now());
//!
//! assert_eq!(engine.view().len(), 2);
//! assert_eq!(engine.text(), "apple"); // inline-completed
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_suggest_core::{DebounceTimer, ReentrancyGuard, Signal, SkipFlag};

use crate::completion::{reconcile_completion, CompletionSpan};
use crate::error::{ConfigError, Result};
use crate::filter::{
    display_formatter, filter_for_mode, FilterMode, Formatter, ItemFilter, SearchPredicate,
    TextFilter,
};
use crate::geometry::{Rect, Size};
use crate::placement::{place, Placement};
use crate::view::FilteredView;

/// An incremental change to the source collection.
///
/// Hosts that mutate their collection in place report the edits here instead
/// of calling [`SuggestEngine::set_source`] with a fresh snapshot, so the
/// view updates with a minimal number of row edits.
#[derive(Debug, Clone)]
pub enum SourceChange<T> {
    /// `items` were inserted starting at `index`.
    Inserted { index: usize, items: Vec<T> },
    /// `count` items were removed starting at `index`.
    Removed { index: usize, count: usize },
    /// The item at `index` was replaced.
    Replaced { index: usize, item: T },
    /// The whole collection was replaced (or detached with `None`).
    Reset(Option<Vec<T>>),
}

/// Arguments of the cancellable `populating` signal.
///
/// A host that fetches suggestions itself calls [`cancel`](Self::cancel)
/// from its slot, updates the source when its fetch lands, and then calls
/// [`SuggestEngine::populate_complete`] to resume the pass.
#[derive(Clone)]
pub struct PopulatingArgs {
    /// The search text this populate pass runs for.
    pub search_text: String,
    cancelled: Arc<AtomicBool>,
}

impl PopulatingArgs {
    /// Take over this populate pass; the engine waits for
    /// [`SuggestEngine::populate_complete`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether a slot has cancelled the pass.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Signals emitted by [`SuggestEngine`].
///
/// Row-level view changes are announced on the view's own signals, reachable
/// through [`SuggestEngine::view`].
pub struct EngineSignals<T> {
    /// The text changed, by the user or by an engine write-back (inline
    /// completion, selection commit).
    pub text_changed: Signal<String>,
    /// The committed search text changed.
    pub search_text_changed: Signal<String>,
    /// The selected item changed.
    pub selection_changed: Signal<Option<T>>,
    /// The inline completion span changed; `None` withdraws it.
    pub completion_changed: Signal<Option<CompletionSpan>>,
    /// A populate pass is starting. Cancellable.
    pub populating: Signal<PopulatingArgs>,
    /// A populate pass finished; carries the resulting view row count.
    pub populated: Signal<usize>,
    /// The drop-down opened.
    pub drop_down_opened: Signal<()>,
    /// The drop-down closed.
    pub drop_down_closed: Signal<()>,
}

impl<T: Clone + Send + 'static> Default for EngineSignals<T> {
    fn default() -> Self {
        Self {
            text_changed: Signal::new(),
            search_text_changed: Signal::new(),
            selection_changed: Signal::new(),
            completion_changed: Signal::new(),
            populating: Signal::new(),
            populated: Signal::new(),
            drop_down_opened: Signal::new(),
            drop_down_closed: Signal::new(),
        }
    }
}

/// An embeddable autocomplete engine over items of type `T`.
///
/// The engine owns a snapshot of the source collection, the filtered view
/// derived from it, the raw and committed search text, and the current
/// selection. Hosts drive it with text and caret updates and observe it
/// through [`EngineSignals`] and the view's row signals.
pub struct SuggestEngine<T> {
    source: Option<Vec<T>>,
    view: FilteredView<T>,
    format: Formatter<T>,
    predicate: SearchPredicate<T>,

    text: String,
    search_text: String,
    caret: usize,
    last_caret: usize,
    selection_len: usize,

    selected_item: Option<T>,
    completion: Option<CompletionSpan>,
    drop_down_open: bool,

    min_prefix_length: i32,
    completion_enabled: bool,
    max_drop_down_height: Option<f32>,

    user_called_populate: bool,
    populate_pending: bool,
    in_populate: bool,
    debounce: DebounceTimer,
    text_suppression: ReentrancyGuard,
    skip_selection_text_update: SkipFlag,

    signals: EngineSignals<T>,
}

impl<T> Default for SuggestEngine<T>
where
    T: Clone + PartialEq + Send + Sync + std::fmt::Display + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SuggestEngine<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create an engine that formats items through their `Display`
    /// implementation.
    pub fn new() -> Self
    where
        T: std::fmt::Display,
    {
        Self::with_formatter(display_formatter())
    }

    /// Create an engine with an explicit item formatter.
    pub fn with_formatter(format: Formatter<T>) -> Self {
        Self {
            source: None,
            view: FilteredView::new(),
            format,
            predicate: SearchPredicate::Text {
                mode: FilterMode::StartsWith,
                filter: default_filter(),
            },
            text: String::new(),
            search_text: String::new(),
            caret: 0,
            last_caret: 0,
            selection_len: 0,
            selected_item: None,
            completion: None,
            drop_down_open: false,
            min_prefix_length: 1,
            completion_enabled: true,
            max_drop_down_height: None,
            user_called_populate: false,
            populate_pending: false,
            in_populate: false,
            debounce: DebounceTimer::new(Duration::ZERO),
            text_suppression: ReentrancyGuard::new(),
            skip_selection_text_update: SkipFlag::new(),
            signals: EngineSignals::default(),
        }
    }

    /// Builder: set the minimum prefix length.
    pub fn with_min_prefix_length(mut self, length: i32) -> Self {
        self.set_min_prefix_length(length);
        self
    }

    /// Builder: enable or disable inline completion.
    pub fn with_completion_enabled(mut self, enabled: bool) -> Self {
        self.set_completion_enabled(enabled);
        self
    }

    /// Builder: set the populate debounce delay.
    pub fn with_populate_delay(self, delay: Duration) -> Self {
        self.debounce.set_interval(delay);
        self
    }

    // --- observation ---

    /// The engine's notification signals.
    pub fn signals(&self) -> &EngineSignals<T> {
        &self.signals
    }

    /// The filtered view the drop-down renders from.
    pub fn view(&self) -> &FilteredView<T> {
        &self.view
    }

    /// The current raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The committed search text the view is filtered by.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// The current selection, if any.
    pub fn selected_item(&self) -> Option<&T> {
        self.selected_item.as_ref()
    }

    /// The current inline completion span, if one is offered.
    pub fn completion_span(&self) -> Option<CompletionSpan> {
        self.completion
    }

    /// Whether the drop-down is open.
    pub fn is_drop_down_open(&self) -> bool {
        self.drop_down_open
    }

    /// The active filter mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.predicate.mode()
    }

    /// The minimum prefix length gate (-1 disables text-triggered populate).
    pub fn min_prefix_length(&self) -> i32 {
        self.min_prefix_length
    }

    /// Whether inline completion is enabled.
    pub fn completion_enabled(&self) -> bool {
        self.completion_enabled
    }

    /// The configured maximum drop-down height, if any.
    pub fn max_drop_down_height(&self) -> Option<f32> {
        self.max_drop_down_height
    }

    // --- source ---

    /// Replace the source collection wholesale.
    ///
    /// The view is cleared and recomputed from scratch against the committed
    /// search text; the old view never participates in the new projection.
    pub fn set_source(&mut self, source: Option<Vec<T>>) {
        self.source = source;
        self.view.clear();
        self.refresh_view();
        tracing::debug!(
            target: "horizon_suggest::engine",
            items = self.source.as_ref().map_or(0, Vec::len),
            rows = self.view.len(),
            "source replaced"
        );
    }

    /// Apply an incremental source change and reconcile the view.
    pub fn apply_source_change(&mut self, change: SourceChange<T>) {
        match change {
            SourceChange::Inserted { index, items } => {
                let source = self.source.get_or_insert_with(Vec::new);
                let index = index.min(source.len());
                for (offset, item) in items.into_iter().enumerate() {
                    source.insert(index + offset, item);
                }
                self.refresh_view();
            }
            SourceChange::Removed { index, count } => {
                if let Some(source) = self.source.as_mut() {
                    let end = (index + count).min(source.len());
                    if index < end {
                        // Drop stale rows first so the reconcile pass does
                        // not churn through replace edits.
                        let removed: Vec<T> = source.drain(index..end).collect();
                        for item in &removed {
                            if let Some(row) = self.view.position_of(item) {
                                self.view.remove_row(row);
                            }
                        }
                    }
                }
                self.refresh_view();
            }
            SourceChange::Replaced { index, item } => {
                if let Some(source) = self.source.as_mut() {
                    if let Some(slot) = source.get_mut(index) {
                        let old = std::mem::replace(slot, item);
                        if let Some(row) = self.view.position_of(&old) {
                            self.view.remove_row(row);
                        }
                    }
                }
                self.refresh_view();
            }
            SourceChange::Reset(source) => self.set_source(source),
        }
    }

    // --- text pipeline ---

    /// Report a text change.
    ///
    /// `user_initiated` distinguishes typing from programmatic writes; only
    /// user-initiated changes can open the drop-down or offer inline
    /// completion. `now` feeds the populate debounce; when a delay is
    /// configured the populate runs from a later [`tick`](Self::tick).
    ///
    /// Engine-initiated text write-backs echoed by the host are recognized
    /// and ignored.
    pub fn set_text(&mut self, text: impl Into<String>, user_initiated: bool, now: Instant) {
        let text = text.into();
        if self.text_suppression.is_suppressed() {
            tracing::trace!(target: "horizon_suggest::engine", "suppressed text echo ignored");
            return;
        }
        if self.text == text {
            return;
        }

        self.text = text.clone();
        self.publish_completion(None); // span invalidated by the edit
        self.signals.text_changed.emit(text);

        // Replacing a selected run mid-string is not forward typing; leave
        // the populate machinery alone until the caret is back at the end.
        if self.completion_enabled
            && self.selection_len > 0
            && self.caret < self.text.chars().count()
        {
            return;
        }

        self.user_called_populate = user_initiated;

        if self.passes_prefix_gate() {
            if self.debounce.interval().is_zero() {
                self.populate_drop_down();
            } else {
                self.debounce.restart(now);
            }
        } else {
            self.debounce.cancel();
            self.populate_pending = false;
            self.commit_search_text(String::new());
            if self.selected_item.is_some() {
                self.skip_selection_text_update.arm();
                self.set_selection(None);
            }
            self.publish_completion(None);
            self.close_drop_down();
            self.refresh_view();
        }
    }

    /// Report the post-edit caret position and selection length, in char
    /// offsets. Call before the matching `set_text`.
    pub fn set_caret(&mut self, position: usize, selection_len: usize) {
        if self.text_suppression.is_suppressed() {
            return;
        }
        self.last_caret = self.caret;
        self.caret = position;
        self.selection_len = selection_len;
    }

    /// Drive the populate debounce.
    ///
    /// Fires the pending populate when its deadline has passed. Returns the
    /// next deadline the host should call back at, if one is pending.
    pub fn tick(&mut self, now: Instant) -> Option<Instant> {
        if self.debounce.fire_if_due(now) {
            self.populate_drop_down();
        }
        self.debounce.deadline()
    }

    /// Resume a populate pass a `populating` slot cancelled.
    ///
    /// Reconciles the view against whatever source the host installed in the
    /// meantime, then runs the completion and drop-down stage.
    pub fn populate_complete(&mut self) {
        self.populate_pending = false;
        self.refresh_view();
        self.finish_populate();
    }

    // --- predicate ---

    /// Select a built-in filter mode.
    ///
    /// `FilterMode::None` installs the passthrough predicate. Requesting
    /// `FilterMode::Custom` is only valid while a custom filter is already
    /// installed; installing one via [`set_text_filter`](Self::set_text_filter)
    /// or [`set_item_filter`](Self::set_item_filter) enters `Custom`
    /// implicitly.
    pub fn set_filter_mode(&mut self, mode: FilterMode) -> Result<()> {
        match mode {
            FilterMode::None => {
                self.predicate = SearchPredicate::Passthrough;
            }
            FilterMode::Custom => {
                if self.predicate.mode() != FilterMode::Custom {
                    return Err(ConfigError::CustomFilterMissing);
                }
                // Custom filter already installed; nothing to change.
            }
            builtin => {
                if let Some(filter) = filter_for_mode(builtin) {
                    self.predicate = SearchPredicate::Text {
                        mode: builtin,
                        filter,
                    };
                }
            }
        }
        self.refresh_view();
        Ok(())
    }

    /// Install or clear a custom text filter.
    ///
    /// Installing enters `FilterMode::Custom` and displaces any item filter;
    /// clearing returns to `FilterMode::None` (no filtering).
    pub fn set_text_filter(&mut self, filter: Option<TextFilter>) {
        self.predicate = match filter {
            Some(filter) => SearchPredicate::Text {
                mode: FilterMode::Custom,
                filter,
            },
            None => SearchPredicate::Passthrough,
        };
        self.refresh_view();
    }

    /// Install or clear a custom item filter.
    ///
    /// Installing enters `FilterMode::Custom` and displaces any text filter;
    /// clearing returns to `FilterMode::None` (no filtering).
    pub fn set_item_filter(&mut self, filter: Option<ItemFilter<T>>) {
        self.predicate = match filter {
            Some(filter) => SearchPredicate::Item(filter),
            None => SearchPredicate::Passthrough,
        };
        self.refresh_view();
    }

    /// Replace the item formatter and re-derive the view.
    pub fn set_formatter(&mut self, format: Formatter<T>) {
        self.format = format;
        self.refresh_view();
    }

    // --- configuration ---

    /// Set the minimum number of chars before typing populates the
    /// drop-down. Values below -1 are clamped to -1, which disables
    /// text-triggered population entirely.
    pub fn set_min_prefix_length(&mut self, length: i32) {
        self.min_prefix_length = length.max(-1);
    }

    /// Set the populate debounce delay in milliseconds.
    ///
    /// Zero populates on every qualifying edit. Negative values are
    /// rejected and leave the current delay in place.
    pub fn set_min_populate_delay_ms(&mut self, delay_ms: i64) -> Result<()> {
        if delay_ms < 0 {
            return Err(ConfigError::NegativeDelay(delay_ms));
        }
        self.debounce.set_interval(Duration::from_millis(delay_ms as u64));
        Ok(())
    }

    /// Cap the drop-down height used by placement queries.
    ///
    /// Negative values are rejected and leave the current cap in place.
    pub fn set_max_drop_down_height(&mut self, height: f32) -> Result<()> {
        if height < 0.0 {
            return Err(ConfigError::NegativeMaxHeight(height));
        }
        self.max_drop_down_height = Some(height);
        Ok(())
    }

    /// Enable or disable inline completion.
    pub fn set_completion_enabled(&mut self, enabled: bool) {
        self.completion_enabled = enabled;
    }

    // --- selection seam ---

    /// Highlight an item, typically from list navigation. The item's display
    /// text is written into the text without triggering a populate.
    pub fn select(&mut self, item: Option<T>) {
        self.set_selection(item);
    }

    /// Commit the current selection: close the drop-down, write the item's
    /// text as both text and search text, and move the caret to the end.
    pub fn commit_selection(&mut self) {
        self.close_drop_down();
        if let Some(item) = self.selected_item.clone() {
            let text = (self.format)(&item);
            let end = text.chars().count();
            self.write_text_internal(text.clone());
            self.commit_search_text(text);
            self.caret = end;
            self.last_caret = end;
            self.selection_len = 0;
        }
        self.publish_completion(None);
        self.refresh_view();
    }

    /// Abandon an in-progress selection: restore the committed search text
    /// and move the caret to the end.
    pub fn cancel_selection(&mut self) {
        let text = self.search_text.clone();
        let end = text.chars().count();
        self.write_text_internal(text);
        self.caret = end;
        self.last_caret = end;
        self.selection_len = 0;
        self.publish_completion(None);
        self.refresh_view();
    }

    // --- drop-down ---

    /// Open the drop-down.
    pub fn open_drop_down(&mut self) {
        if !self.drop_down_open {
            self.drop_down_open = true;
            self.signals.drop_down_opened.emit(());
        }
    }

    /// Close the drop-down.
    pub fn close_drop_down(&mut self) {
        if self.drop_down_open {
            self.drop_down_open = false;
            self.signals.drop_down_closed.emit(());
        }
    }

    /// Toggle the drop-down.
    pub fn toggle_drop_down(&mut self) {
        if self.drop_down_open {
            self.close_drop_down();
        } else {
            self.open_drop_down();
        }
    }

    /// Compute where the drop-down goes, applying the configured maximum
    /// height. `None` anchor (a detached text entry) yields no placement.
    pub fn compute_placement(
        &self,
        anchor: Option<Rect>,
        viewport: Rect,
        content: Size,
    ) -> Option<Placement> {
        let anchor = anchor?;
        place(anchor, viewport, content, self.max_drop_down_height)
    }

    // --- internals ---

    fn passes_prefix_gate(&self) -> bool {
        self.min_prefix_length >= 0
            && self.text.chars().count() >= self.min_prefix_length as usize
    }

    fn populate_drop_down(&mut self) {
        if self.in_populate {
            tracing::warn!(
                target: "horizon_suggest::engine",
                "populate requested while a pass is running, ignored"
            );
            return;
        }
        self.in_populate = true;

        self.commit_search_text(self.text.clone());

        let args = PopulatingArgs {
            search_text: self.search_text.clone(),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        self.signals.populating.emit(args.clone());

        if args.is_cancelled() {
            // The host substituted its own fetch; it resumes the pass via
            // populate_complete().
            self.populate_pending = true;
            tracing::debug!(
                target: "horizon_suggest::engine",
                search_text = %self.search_text,
                "populate deferred to host"
            );
        } else {
            self.refresh_view();
            self.finish_populate();
        }

        self.in_populate = false;
    }

    fn finish_populate(&mut self) {
        let count = self.view.len();
        self.signals.populated.emit(count);

        if self.user_called_populate && count > 0 {
            self.open_drop_down();
        } else {
            self.close_drop_down();
        }

        let (completion, selection) = reconcile_completion(
            &self.view,
            &self.text,
            self.caret,
            self.last_caret,
            self.predicate.mode(),
            self.completion_enabled,
            self.user_called_populate,
            &self.format,
        );

        match completion {
            Some(tc) => {
                self.write_text_internal(tc.text);
                self.selection_len = tc.span.len;
                self.publish_completion(Some(tc.span));
            }
            None => self.publish_completion(None),
        }

        // The completion pass already wrote the text; the selection update
        // must not write it again.
        self.skip_selection_text_update.arm();
        self.set_selection(selection);
    }

    fn refresh_view(&mut self) -> usize {
        self.view.reconcile(
            self.source.as_deref(),
            &self.search_text,
            &self.predicate,
            &self.format,
        )
    }

    fn set_selection(&mut self, item: Option<T>) {
        let skip_text_update = self.skip_selection_text_update.take();
        if item == self.selected_item {
            return;
        }
        self.selected_item = item.clone();
        if !skip_text_update {
            if let Some(ref selected) = item {
                let text = (self.format)(selected);
                let end = text.chars().count();
                self.write_text_internal(text);
                self.caret = end;
                self.last_caret = end;
                self.selection_len = 0;
            }
        }
        self.signals.selection_changed.emit(item);
    }

    /// Write text from inside the engine. The suppression scope stays alive
    /// across the emit so the host's echoing `set_text` is ignored.
    fn write_text_internal(&mut self, text: String) {
        if self.text == text {
            return;
        }
        let _scope = self.text_suppression.enter();
        self.text = text.clone();
        self.signals.text_changed.emit(text);
    }

    fn commit_search_text(&mut self, text: String) {
        if self.search_text == text {
            return;
        }
        self.search_text = text.clone();
        self.signals.search_text_changed.emit(text);
    }

    fn publish_completion(&mut self, span: Option<CompletionSpan>) {
        if self.completion == span {
            return;
        }
        self.completion = span;
        self.signals.completion_changed.emit(span);
    }
}

fn default_filter() -> TextFilter {
    filter_for_mode(FilterMode::StartsWith)
        .unwrap_or_else(|| Arc::new(|_: &str, _: &str| true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(items: &[&str]) -> SuggestEngine<String> {
        let mut engine = SuggestEngine::new();
        engine.set_source(Some(items.iter().map(|s| s.to_string()).collect()));
        engine
    }

    fn type_text(engine: &mut SuggestEngine<String>, text: &str) {
        engine.set_caret(text.chars().count(), 0);
        engine.set_text(text, true, Instant::now());
    }

    #[test]
    fn test_typing_filters_and_completes() {
        let mut engine = engine_with(&["apple", "apricot", "banana"]);
        type_text(&mut engine, "ap");

        assert_eq!(
            engine.view().items(),
            vec!["apple".to_string(), "apricot".to_string()]
        );
        assert_eq!(engine.text(), "apple");
        assert_eq!(
            engine.completion_span(),
            Some(CompletionSpan { start: 2, len: 3 })
        );
        assert_eq!(engine.selected_item(), Some(&"apple".to_string()));
        assert!(engine.is_drop_down_open());
    }

    #[test]
    fn test_programmatic_text_does_not_open_drop_down() {
        let mut engine = engine_with(&["apple", "apricot"]);
        engine.set_caret(2, 0);
        engine.set_text("ap", false, Instant::now());

        assert_eq!(engine.view().len(), 2);
        assert!(!engine.is_drop_down_open());
        assert_eq!(engine.completion_span(), None);
        assert_eq!(engine.text(), "ap");
    }

    #[test]
    fn test_below_gate_clears_search_and_selection() {
        let mut engine = engine_with(&["apple"]).with_min_prefix_length(2);
        type_text(&mut engine, "ap");
        assert!(engine.is_drop_down_open());
        assert_eq!(engine.search_text(), "ap");

        // Shorten below the gate
        engine.set_caret(1, 0);
        engine.set_text("a", true, Instant::now());

        assert_eq!(engine.search_text(), "");
        assert_eq!(engine.selected_item(), None);
        assert!(!engine.is_drop_down_open());
        assert_eq!(engine.completion_span(), None);
    }

    #[test]
    fn test_min_prefix_minus_one_disables_populate() {
        let mut engine = engine_with(&["apple"]);
        engine.set_min_prefix_length(-5); // Clamped to -1
        assert_eq!(engine.min_prefix_length(), -1);

        type_text(&mut engine, "ap");
        assert!(!engine.is_drop_down_open());
        assert_eq!(engine.search_text(), "");
    }

    #[test]
    fn test_debounce_defers_populate() {
        let mut engine = engine_with(&["apple", "banana"]);
        engine.set_min_populate_delay_ms(200).unwrap();

        let t0 = Instant::now();
        engine.set_caret(2, 0);
        engine.set_text("ap", true, t0);

        // Nothing committed yet: the view still mirrors the empty search text
        assert_eq!(engine.search_text(), "");
        assert_eq!(engine.view().len(), 2);
        assert!(engine.tick(t0 + Duration::from_millis(100)).is_some());
        assert_eq!(engine.search_text(), "");

        engine.tick(t0 + Duration::from_millis(200));
        assert_eq!(engine.search_text(), "ap");
        assert_eq!(engine.view().items(), vec!["apple".to_string()]);
        assert!(engine.is_drop_down_open());
    }

    #[test]
    fn test_debounce_restart_replaces_pending_fire() {
        let mut engine = engine_with(&["apple", "apricot", "banana"]);
        engine.set_min_populate_delay_ms(200).unwrap();

        let t0 = Instant::now();
        engine.set_caret(1, 0);
        engine.set_text("a", true, t0);
        engine.set_caret(2, 0);
        engine.set_text("ap", true, t0 + Duration::from_millis(100));

        // First deadline passed, but the restart pushed it out
        engine.tick(t0 + Duration::from_millis(200));
        assert_eq!(engine.search_text(), "");

        engine.tick(t0 + Duration::from_millis(300));
        assert_eq!(engine.search_text(), "ap");
        assert_eq!(
            engine.view().items(),
            vec!["apple".to_string(), "apricot".to_string()]
        );
    }

    #[test]
    fn test_mid_string_selection_replace_skips_populate() {
        let mut engine = engine_with(&["apple"]);

        // Overtyping a selected run with the caret left mid-string must not
        // commit a search or open the drop-down.
        engine.set_caret(1, 1);
        engine.set_text("xp", true, Instant::now());

        assert_eq!(engine.text(), "xp");
        assert_eq!(engine.search_text(), "");
        assert!(!engine.is_drop_down_open());

        // With completion off the same edit runs the normal pipeline
        engine.set_completion_enabled(false);
        engine.set_caret(1, 1);
        engine.set_text("ap", true, Instant::now());
        assert_eq!(engine.search_text(), "ap");
        assert_eq!(engine.view().items(), vec!["apple".to_string()]);
    }

    #[test]
    fn test_edit_withdraws_published_completion() {
        let mut engine = engine_with(&["apple"]);
        let spans = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let s = spans.clone();
        engine.signals().completion_changed.connect(move |&span| {
            s.lock().push(span);
        });

        type_text(&mut engine, "ap");
        assert_eq!(*spans.lock(), vec![Some(CompletionSpan { start: 2, len: 3 })]);

        // The backspace withdraws the stale span before the new pass publishes
        engine.set_caret(4, 0);
        engine.set_text("appl", true, Instant::now());
        assert_eq!(
            *spans.lock(),
            vec![
                Some(CompletionSpan { start: 2, len: 3 }),
                None,
                Some(CompletionSpan { start: 4, len: 1 }),
            ]
        );
    }

    #[test]
    fn test_suppressed_echo_does_not_repopulate() {
        let mut engine = engine_with(&["apple"]);
        let populates = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let p = populates.clone();
        engine.signals().populated.connect(move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });

        type_text(&mut engine, "ap");
        assert_eq!(populates.load(Ordering::SeqCst), 1);

        // The host echoes the engine's completion write-back after the fact;
        // the text already matches, so nothing runs.
        engine.set_text("apple", true, Instant::now());
        assert_eq!(populates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_populating_cancel_and_resume() {
        let mut engine: SuggestEngine<String> = SuggestEngine::new();
        engine.signals().populating.connect(|args| {
            args.cancel();
        });

        type_text(&mut engine, "ap");
        assert!(engine.view().is_empty());
        assert!(!engine.is_drop_down_open());

        // Host's fetch lands
        engine.set_source(Some(vec!["apple".to_string(), "apricot".to_string()]));
        engine.populate_complete();

        assert_eq!(engine.view().len(), 2);
        assert!(engine.is_drop_down_open());
        assert_eq!(engine.text(), "apple");
    }

    #[test]
    fn test_source_change_inserted() {
        let mut engine = engine_with(&["apple", "apricot"]);
        type_text(&mut engine, "ap");

        engine.apply_source_change(SourceChange::Inserted {
            index: 1,
            items: vec!["appliance".to_string(), "banana".to_string()],
        });

        // "banana" fails the filter, "appliance" lands in source order
        assert_eq!(
            engine.view().items(),
            vec![
                "apple".to_string(),
                "appliance".to_string(),
                "apricot".to_string()
            ]
        );
    }

    #[test]
    fn test_source_change_removed() {
        let mut engine = engine_with(&["apple", "appliance", "apricot"]);
        type_text(&mut engine, "ap");
        assert_eq!(engine.view().len(), 3);

        engine.apply_source_change(SourceChange::Removed { index: 1, count: 1 });
        assert_eq!(
            engine.view().items(),
            vec!["apple".to_string(), "apricot".to_string()]
        );
    }

    #[test]
    fn test_source_change_replaced() {
        let mut engine = engine_with(&["apple", "banana"]);
        type_text(&mut engine, "ap");
        assert_eq!(engine.view().len(), 1);

        engine.apply_source_change(SourceChange::Replaced {
            index: 1,
            item: "apricot".to_string(),
        });
        assert_eq!(
            engine.view().items(),
            vec!["apple".to_string(), "apricot".to_string()]
        );
    }

    #[test]
    fn test_source_reset_recomputes_from_scratch() {
        let mut engine = engine_with(&["apple", "apricot"]);
        type_text(&mut engine, "ap");

        engine.apply_source_change(SourceChange::Reset(Some(vec![
            "apogee".to_string(),
            "banana".to_string(),
        ])));
        assert_eq!(engine.view().items(), vec!["apogee".to_string()]);

        engine.apply_source_change(SourceChange::Reset(None));
        assert!(engine.view().is_empty());
    }

    #[test]
    fn test_filter_mode_transitions() {
        let mut engine = engine_with(&["apple", "grape"]);

        // Custom without an installed filter is rejected
        assert_eq!(
            engine.set_filter_mode(FilterMode::Custom),
            Err(ConfigError::CustomFilterMissing)
        );
        assert_eq!(engine.filter_mode(), FilterMode::StartsWith);

        engine.set_text_filter(Some(Arc::new(|search: &str, text: &str| {
            text.ends_with(search)
        })));
        assert_eq!(engine.filter_mode(), FilterMode::Custom);
        assert_eq!(engine.set_filter_mode(FilterMode::Custom), Ok(()));

        // A built-in mode displaces the custom filter
        engine.set_filter_mode(FilterMode::Contains).unwrap();
        assert_eq!(engine.filter_mode(), FilterMode::Contains);

        // Clearing a custom filter lands on no filtering
        engine.set_item_filter(Some(Arc::new(|_: &str, _: &String| true)));
        assert_eq!(engine.filter_mode(), FilterMode::Custom);
        engine.set_item_filter(None);
        assert_eq!(engine.filter_mode(), FilterMode::None);
    }

    #[test]
    fn test_custom_text_filter_filters_view() {
        let mut engine = engine_with(&["apple", "grape", "melon"]);
        engine.set_text_filter(Some(Arc::new(|search: &str, text: &str| {
            text.ends_with(search)
        })));

        type_text(&mut engine, "e");
        assert_eq!(
            engine.view().items(),
            vec!["apple".to_string(), "grape".to_string()]
        );
    }

    #[test]
    fn test_none_mode_mirrors_source() {
        let mut engine = engine_with(&["cherry", "apple"]);
        engine.set_filter_mode(FilterMode::None).unwrap();

        type_text(&mut engine, "zzz");
        assert_eq!(
            engine.view().items(),
            vec!["cherry".to_string(), "apple".to_string()]
        );
    }

    #[test]
    fn test_config_rejection_leaves_state() {
        let mut engine: SuggestEngine<String> = SuggestEngine::new();
        engine.set_min_populate_delay_ms(100).unwrap();

        assert_eq!(
            engine.set_min_populate_delay_ms(-1),
            Err(ConfigError::NegativeDelay(-1))
        );
        assert_eq!(engine.debounce.interval(), Duration::from_millis(100));

        engine.set_max_drop_down_height(200.0).unwrap();
        assert_eq!(
            engine.set_max_drop_down_height(-3.0),
            Err(ConfigError::NegativeMaxHeight(-3.0))
        );
        assert_eq!(engine.max_drop_down_height(), Some(200.0));
    }

    #[test]
    fn test_commit_selection_writes_text() {
        let mut engine = engine_with(&["apple", "apricot"]);
        type_text(&mut engine, "ap");

        engine.select(Some("apricot".to_string()));
        engine.commit_selection();

        assert_eq!(engine.text(), "apricot");
        assert_eq!(engine.search_text(), "apricot");
        assert!(!engine.is_drop_down_open());
        assert_eq!(engine.completion_span(), None);
    }

    #[test]
    fn test_cancel_selection_restores_search_text() {
        let mut engine = engine_with(&["apple", "apricot"]).with_completion_enabled(false);
        type_text(&mut engine, "ap");
        assert_eq!(engine.search_text(), "ap");

        engine.select(Some("apricot".to_string()));
        assert_eq!(engine.text(), "apricot");

        engine.cancel_selection();
        assert_eq!(engine.text(), "ap");
    }

    #[test]
    fn test_drop_down_signals() {
        let mut engine: SuggestEngine<String> = SuggestEngine::new();
        let opened = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let closed = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let o = opened.clone();
        engine.signals().drop_down_opened.connect(move |_| {
            o.fetch_add(1, Ordering::SeqCst);
        });
        let c = closed.clone();
        engine.signals().drop_down_closed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        engine.open_drop_down();
        engine.open_drop_down(); // Already open, silent
        engine.toggle_drop_down();

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_placement_query() {
        let mut engine: SuggestEngine<String> = SuggestEngine::new();
        engine.set_max_drop_down_height(100.0).unwrap();

        let anchor = Rect::new(10.0, 10.0, 200.0, 30.0);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let placement = engine
            .compute_placement(Some(anchor), viewport, Size::new(200.0, 400.0))
            .unwrap();
        assert_eq!(placement.size.height, 100.0);

        // Detached anchor
        assert!(engine
            .compute_placement(None, viewport, Size::new(200.0, 400.0))
            .is_none());
    }

    #[test]
    fn test_completion_disabled_selects_exact_match_only() {
        let mut engine = engine_with(&["apple", "ap"]).with_completion_enabled(false);
        type_text(&mut engine, "ap");

        assert_eq!(engine.text(), "ap");
        assert_eq!(engine.completion_span(), None);
        assert_eq!(engine.selected_item(), Some(&"ap".to_string()));
    }
}
