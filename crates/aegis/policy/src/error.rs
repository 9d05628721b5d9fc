//! Error types for the aegis-policy crate.

use thiserror::Error;

/// Errors raised while configuring a policy or naming its signals.
///
/// Classification itself never fails; these only cover construction and
/// parsing at the crate boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    /// Window size must hold at least one sample.
    #[error("invalid window size: {0} (must be at least 1)")]
    InvalidWindowSize(usize),

    /// Sensitivity must be a positive, finite multiple of the standard deviation.
    #[error("invalid sensitivity sigma: {0} (must be positive and finite)")]
    InvalidSensitivity(f64),

    /// Signal name is not one of the tracked keys.
    #[error("unknown signal: {0}")]
    UnknownSignal(String),
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
