//! Horizon Suggest - an embeddable autocomplete engine.
//!
//! The engine owns the suggestion pipeline a completing text entry needs,
//! without owning any UI: a filtered, observable view of the source
//! collection, inline text completion, selection reconciliation, populate
//! debouncing, and drop-down placement. Hosts feed it text and caret
//! updates and render from its view and signals.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use horizon_suggest::SuggestEngine;
//!
//! let mut engine: SuggestEngine<String> = SuggestEngine::new();
//! engine.set_source(Some(vec![
//!     "apple".into(),
//!     "apricot".into(),
//!     "banana".into(),
//! ]));
//!
//! engine.signals().populated.connect(|count| {
//!     println!("{count} suggestions");
//! });
//!
//! engine.set_caret(2, 0);
//! engine.set_text("ap", true, Instant::now());
//!
//! assert_eq!(engine.view().len(), 2);
//! ```

pub mod completion;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod placement;
pub mod view;


pub use completion::{CompletionSpan, TextCompletion};
pub use engine::{EngineSignals, PopulatingArgs, SourceChange, SuggestEngine};
pub use error::{ConfigError, Result};
pub use filter::{
    display_formatter, FilterMode, Formatter, ItemFilter, SearchPredicate, TextFilter,
};
pub use geometry::{Point, Rect, Size};
pub use placement::{place, DropSide, Placement};
pub use view::{FilteredView, ViewSignals};

pub use horizon_suggest_core::{ConnectionGuard, ConnectionId, Signal};
