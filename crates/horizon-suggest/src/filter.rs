//! Search predicate library.
//!
//! A predicate decides, for the current search text, whether a source item
//! belongs in the filtered view. Predicates come in three shapes:
//!
//! - built-in text matching, selected by [`FilterMode`] (prefix, substring,
//!   equality, each with a case-sensitive variant)
//! - a custom [`TextFilter`] over the item's display string
//! - a custom [`ItemFilter`] over the item itself (for matching against
//!   fields the display string does not show)
//!
//! Case-insensitive variants use Unicode lowercase folding; case-sensitive
//! variants compare code points directly.

use std::fmt::Display;
use std::sync::Arc;

/// Built-in text matching strategies.
///
/// `Custom` indicates a caller-supplied [`TextFilter`] or [`ItemFilter`] is
/// in effect; [`filter_for_mode`] returns no built-in filter for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// No filtering; every item passes.
    None,
    /// Item text starts with the search text, ignoring case.
    #[default]
    StartsWith,
    /// Item text starts with the search text, exact case.
    StartsWithCaseSensitive,
    /// Item text contains the search text, ignoring case.
    Contains,
    /// Item text contains the search text, exact case.
    ContainsCaseSensitive,
    /// Item text equals the search text, ignoring case.
    Equals,
    /// Item text equals the search text, exact case.
    EqualsCaseSensitive,
    /// A caller-supplied filter is in effect.
    Custom,
}

impl FilterMode {
    /// Whether this is one of the two prefix-matching modes.
    ///
    /// The completion reconciler treats prefix modes specially: the first
    /// view row is already the best completion candidate.
    pub fn is_starts_with(&self) -> bool {
        matches!(self, Self::StartsWith | Self::StartsWithCaseSensitive)
    }
}

/// A text predicate: `(search_text, item_text) -> matches`.
pub type TextFilter = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// An item predicate: `(search_text, item) -> matches`.
pub type ItemFilter<T> = Arc<dyn Fn(&str, &T) -> bool + Send + Sync>;

/// Converts an item to the display string used for text matching and
/// completion splicing.
pub type Formatter<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// A formatter that uses the item's `Display` implementation.
pub fn display_formatter<T: Display>() -> Formatter<T> {
    Arc::new(|item: &T| item.to_string())
}

/// Resolve a built-in mode to its text filter.
///
/// Returns `None` for [`FilterMode::None`] (no filtering, every item passes)
/// and [`FilterMode::Custom`] (the caller supplies the filter).
pub fn filter_for_mode(mode: FilterMode) -> Option<TextFilter> {
    match mode {
        FilterMode::None | FilterMode::Custom => None,
        FilterMode::StartsWith => Some(Arc::new(|search, text| {
            starts_with_ignore_case(text, search)
        })),
        FilterMode::StartsWithCaseSensitive => {
            Some(Arc::new(|search, text| text.starts_with(search)))
        }
        FilterMode::Contains => Some(Arc::new(|search, text| contains_ignore_case(text, search))),
        FilterMode::ContainsCaseSensitive => Some(Arc::new(|search, text| text.contains(search))),
        FilterMode::Equals => Some(Arc::new(|search, text| eq_ignore_case(text, search))),
        FilterMode::EqualsCaseSensitive => Some(Arc::new(|search, text| text == search)),
    }
}

/// Whether `text` starts with `prefix`, under Unicode lowercase folding.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text_chars = text.chars().flat_map(char::to_lowercase);
    let mut prefix_chars = prefix.chars().flat_map(char::to_lowercase);
    loop {
        match (prefix_chars.next(), text_chars.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(p), Some(t)) if p == t => continue,
            _ => return false,
        }
    }
}

/// Whether `text` and `other` are equal under Unicode lowercase folding.
pub fn eq_ignore_case(text: &str, other: &str) -> bool {
    let mut a = text.chars().flat_map(char::to_lowercase);
    let mut b = other.chars().flat_map(char::to_lowercase);
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => continue,
            _ => return false,
        }
    }
}

/// Whether `text` contains `needle`, under Unicode lowercase folding.
pub fn contains_ignore_case(text: &str, needle: &str) -> bool {
    let text: String = text.chars().flat_map(char::to_lowercase).collect();
    let needle: String = needle.chars().flat_map(char::to_lowercase).collect();
    text.contains(&needle)
}

/// The effective matching rule, tagged by where the match runs.
///
/// The engine owns one of these and swaps it when the filter mode or a custom
/// filter changes. Keeping the variants explicit means every (mode, filter)
/// combination is representable and the transition rules are total.
pub enum SearchPredicate<T> {
    /// No filtering; every item passes.
    Passthrough,
    /// Match against the item's display string.
    Text { mode: FilterMode, filter: TextFilter },
    /// Match against the item itself.
    Item(ItemFilter<T>),
}

impl<T> Clone for SearchPredicate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Passthrough => Self::Passthrough,
            Self::Text { mode, filter } => Self::Text {
                mode: *mode,
                filter: filter.clone(),
            },
            Self::Item(filter) => Self::Item(filter.clone()),
        }
    }
}

impl<T> SearchPredicate<T> {
    /// Whether `item` passes this predicate for `search_text`.
    ///
    /// `format` supplies the display string for text predicates; item
    /// predicates receive the item directly.
    pub fn matches(&self, search_text: &str, item: &T, format: &Formatter<T>) -> bool {
        match self {
            Self::Passthrough => true,
            Self::Text { filter, .. } => filter(search_text, &format(item)),
            Self::Item(filter) => filter(search_text, item),
        }
    }

    /// The filter mode this predicate runs under.
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Passthrough => FilterMode::None,
            Self::Text { mode, .. } => *mode,
            Self::Item(_) => FilterMode::Custom,
        }
    }
}
