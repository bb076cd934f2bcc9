//! Error types for Horizon Suggest.

use thiserror::Error;

/// Result type for engine configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejected configuration values.
///
/// A rejected setter leaves the engine's state untouched. Coercible values
/// (a minimum prefix length below -1) are clamped instead and never error;
/// empty results and unavailable placements are `None`, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The populate delay must be zero or positive.
    #[error("populate delay must be non-negative, got {0} ms")]
    NegativeDelay(i64),

    /// The maximum drop-down height must be zero or positive.
    #[error("maximum drop-down height must be non-negative, got {0}")]
    NegativeMaxHeight(f32),

    /// `FilterMode::Custom` was requested with no custom filter installed.
    #[error("custom filter mode requires a text or item filter to be installed first")]
    CustomFilterMissing,
}
