//! # aegis-policy
//!
//! Self-adjusting "normal" ranges for the label-free signals of a deployed
//! classification model.
//!
//! ## Overview
//!
//! A static cutoff for entropy or gradient sensitivity is meaningless across
//! models and datasets, so the policy learns one per deployment:
//!
//! ```text
//!   SignalVector ──► update() ──► SignalWindow (per key, FIFO, W samples)
//!                                     │
//!                                     ▼ (> 5 samples)
//!                                 Baseline { mean, std + 1e-6 }
//!                                     │
//!   SignalVector ──► check_violation() ◄── thresholds(): mean + σ·std
//!                        │
//!                        ▼
//!                  [violated keys]
//! ```
//!
//! Tracked keys are fixed: `entropy`, `gradient_norm`, `drift`. Any other
//! name in a [`SignalVector`] is carried but ignored.
//!
//! ## Example
//!
//! ```rust
//! use aegis_policy::{AdaptivePolicy, SignalKey, SignalVector};
//!
//! let mut policy = AdaptivePolicy::with_defaults();
//! let reading = SignalVector::new()
//!     .with_key(SignalKey::Entropy, 0.95)
//!     .with_key(SignalKey::GradientNorm, 0.4);
//!
//! policy.update(&reading);
//! let violations = policy.check_violation(&reading);
//! assert_eq!(violations, vec![SignalKey::Entropy]);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod policy;
pub mod signal;
pub mod window;

pub use config::PolicyConfig;
pub use error::{PolicyError, PolicyResult};
pub use policy::{AdaptivePolicy, Thresholds};
pub use signal::{SignalKey, SignalVector};
pub use window::{Baseline, SignalWindow};

/// Default number of samples kept per signal.
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Default threshold width in standard deviations.
pub const DEFAULT_SENSITIVITY_SIGMA: f64 = 3.0;

/// A window must hold strictly more samples than this before its
/// statistics replace the cold-start baseline.
pub const MIN_SAMPLES_FOR_BASELINE: usize = 5;

/// Added to every derived standard deviation so thresholds never collapse
/// onto the mean.
pub const STD_FLOOR: f64 = 1e-6;
