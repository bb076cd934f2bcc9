//! Core systems for Horizon Suggest.
//!
//! This crate provides the framework-independent infrastructure of the
//! Horizon Suggest engine:
//!
//! - **Signal/Slot System**: Type-safe engine-to-host notification
//! - **Debounce Timer**: Restartable single-shot deadline, event-loop free
//! - **Suppression**: Scoped re-entrancy guards for self-inflicted
//!   notifications
//!
//! Everything here assumes the single-threaded cooperative model the engine
//! runs under: signal dispatch is direct and synchronous, and the debounce
//! timer is driven by the host's own clock.
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_suggest_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use horizon_suggest_core::DebounceTimer;
//!
//! let timer = DebounceTimer::new(Duration::from_millis(250));
//! timer.restart(Instant::now());
//!
//! // Later, from the host's tick:
//! if timer.fire_if_due(Instant::now()) {
//!     // Run the debounced work
//! }
//! ```

pub mod logging;
pub mod signal;
pub mod suppress;
pub mod timer;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use suppress::{ReentrancyGuard, SkipFlag, SuppressScope};
pub use timer::DebounceTimer;

/// Route test traces through `RUST_LOG`. Safe to call from every test; only
/// the first call installs the subscriber.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
