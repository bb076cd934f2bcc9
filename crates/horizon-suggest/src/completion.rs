//! Inline completion and selection reconciliation.
//!
//! After the view synchronizes, this pass decides two things from the view
//! and the raw text: whether to offer an inline completion (the spliced text
//! plus the span the host should show selected after the caret), and which
//! view item, if any, becomes the current selection.
//!
//! The engine invokes this under its suppression guards; the functions here
//! are pure over their inputs.

use crate::filter::{eq_ignore_case, starts_with_ignore_case, FilterMode, Formatter};
use crate::view::FilteredView;

/// A selected span of the completed text, in char offsets.
///
/// `start..start + len` is the machine-appended remainder the host should
/// render as selected text after the caret. The span is only meaningful for
/// the text it was produced with; the next edit invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSpan {
    /// Char offset where the appended remainder begins.
    pub start: usize,
    /// Char length of the appended remainder. Zero when the candidate adds
    /// nothing beyond the typed text.
    pub len: usize,
}

/// An inline completion: the full spliced text and the span to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCompletion {
    /// The typed text with the candidate's remainder appended. Typed chars
    /// keep their original casing; only the remainder comes from the
    /// candidate.
    pub text: String,
    /// The remainder span within `text`.
    pub span: CompletionSpan,
}

/// Reconcile completion and selection against the current view.
///
/// Rules, in order:
///
/// 1. An empty view yields no completion and no selection.
/// 2. When completion is enabled, the change was user-initiated, and the
///    caret sits at the end of the text having moved forward, the first
///    prefix-matching view item becomes the completion candidate. For the
///    two prefix filter modes the first view row is already that item; other
///    modes scan for a case-insensitive prefix match. A found candidate is
///    always the selection, even when its prefix disagrees with the typed
///    text in more than case and no splice is offered.
/// 3. Otherwise the selection is the first view item whose display text
///    equals the raw text exactly.
/// 4. No match is an ordinary `None`, not an error.
#[allow(clippy::too_many_arguments)]
pub fn reconcile_completion<T: Clone + PartialEq>(
    view: &FilteredView<T>,
    raw_text: &str,
    caret: usize,
    last_caret: usize,
    mode: FilterMode,
    completion_enabled: bool,
    user_initiated: bool,
    format: &Formatter<T>,
) -> (Option<TextCompletion>, Option<T>) {
    if view.is_empty() {
        return (None, None);
    }

    let text_chars = raw_text.chars().count();
    let caret_at_end = caret == text_chars;
    let caret_moved_forward = caret > last_caret;

    if completion_enabled
        && user_initiated
        && !raw_text.is_empty()
        && caret_at_end
        && caret_moved_forward
    {
        let candidate = if mode.is_starts_with() {
            // Prefix modes keep the view prefix-sorted relative to the
            // search text, so the top row is the candidate.
            view.first()
        } else {
            view.items()
                .into_iter()
                .find(|item| starts_with_ignore_case(&format(item), raw_text))
        };

        if let Some(candidate) = candidate {
            let candidate_text = format(&candidate);
            let completion = splice(raw_text, &candidate_text);
            tracing::trace!(
                target: "horizon_suggest::completion",
                candidate = %candidate_text,
                spliced = completion.is_some(),
                "inline completion candidate"
            );
            return (completion, Some(candidate));
        }
    }

    let selection = view
        .items()
        .into_iter()
        .find(|item| format(item) == raw_text);
    (None, selection)
}

/// Build the spliced completion text, if the typed text agrees with the
/// candidate's prefix up to case over their common length.
fn splice(raw_text: &str, candidate_text: &str) -> Option<TextCompletion> {
    let raw_len = raw_text.chars().count();
    let candidate_len = candidate_text.chars().count();
    let overlap = raw_len.min(candidate_len);

    let raw_prefix: String = raw_text.chars().take(overlap).collect();
    let candidate_prefix: String = candidate_text.chars().take(overlap).collect();
    if !eq_ignore_case(&raw_prefix, &candidate_prefix) {
        return None;
    }

    let remainder: String = candidate_text.chars().skip(overlap).collect();
    let remainder_len = remainder.chars().count();
    Some(TextCompletion {
        text: format!("{raw_text}{remainder}"),
        span: CompletionSpan {
            start: raw_len,
            len: remainder_len,
        },
    })
}
