//! Logging facilities for Horizon Suggest.
//!
//! Horizon Suggest uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in the host application:
//!
//! ```ignore
//! use tracing_subscriber;
//!
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_suggest_core";
    /// Debounce timer target.
    pub const TIMER: &str = "horizon_suggest_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_suggest_core::signal";
    /// Filtered view synchronizer target.
    pub const VIEW: &str = "horizon_suggest::view";
    /// Completion/selection reconciler target.
    pub const COMPLETION: &str = "horizon_suggest::completion";
    /// Drop-down placement target.
    pub const PLACEMENT: &str = "horizon_suggest::placement";
    /// Engine orchestration target.
    pub const ENGINE: &str = "horizon_suggest::engine";
}
