//! Error types for the aegis-monitor crate.

use aegis_policy::PolicyError;
use thiserror::Error;

/// Errors raised at the monitoring boundary.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// No model is deployed in the slot.
    #[error("no active deployment")]
    NoActiveDeployment,

    /// A computed signal was NaN or infinite.
    #[error("non-finite value for signal {key}: {value}")]
    NonFiniteSignal { key: String, value: f64 },

    /// Confidence outside `[0.0, 1.0]` or not finite.
    #[error("invalid confidence: {0} (must be within [0.0, 1.0])")]
    InvalidConfidence(f64),

    #[error("invalid monitor configuration: {0}")]
    InvalidConfig(String),

    /// A previous holder of the lock panicked.
    #[error("monitoring state lock poisoned")]
    LockError,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for monitoring operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
