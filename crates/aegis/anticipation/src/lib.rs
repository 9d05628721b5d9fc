//! # aegis-anticipation
//!
//! Maps adaptive-threshold violations to a qualitative failure risk, a
//! bounded failure anticipation index (FAI) and an ordered causal trace.
//!
//! The engine owns no state and performs no I/O. It is meant to run right
//! after [`aegis_policy::AdaptivePolicy::check_violation`]:
//!
//! ```rust
//! use aegis_anticipation::{FailureAnticipationEngine, RiskLevel};
//! use aegis_policy::{SignalKey, SignalVector};
//!
//! let engine = FailureAnticipationEngine::new();
//! let metrics = SignalVector::new()
//!     .with_key(SignalKey::Entropy, 0.2)
//!     .with_key(SignalKey::Drift, 0.6);
//!
//! let verdict = engine.assess_risk(&metrics, &[SignalKey::Drift]);
//! assert_eq!(verdict.risk_level, RiskLevel::Warning);
//! assert_eq!(verdict.causal_trace.to_string(), "Distribution Drift");
//! ```

#![deny(unsafe_code)]

pub mod engine;
pub mod risk;
pub mod trace;

pub use engine::FailureAnticipationEngine;
pub use risk::{RiskAssessment, RiskLevel};
pub use trace::{CausalFactor, CausalTrace, TraceParseError, NOMINAL_TRACE, TRACE_SEPARATOR};
