//! # aegis-monitor
//!
//! Deployment-scoped, label-free failure monitoring for a served
//! classification model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── DeploymentSlot ────────────────────────────┐
//! │  deploy() ──► Arc<MonitoringContext> (atomic swap, fresh baselines)    │
//! │                                                                        │
//! │  observe_inference() / observe_epoch()                                 │
//! │        │                                                               │
//! │        ▼                                                               │
//! │  SignalReading::resolve()   neutral 0.0 for failed signals            │
//! │        │                                                               │
//! │        ▼  ── one lock ──────────────────────────────┐                  │
//! │  admission gate ─► AdaptivePolicy::update()         │                  │
//! │                    AdaptivePolicy::check_violation()│                  │
//! │                    AdaptivePolicy::thresholds()     │                  │
//! │        ─────────────────────────────────────────────┘                  │
//! │        ▼                                                               │
//! │  FailureAnticipationEngine::assess_risk() ──► MonitoringOutcome        │
//! │        │                                                               │
//! │        └──► MonitorEvent::RiskLevelChanged (broadcast)                 │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use aegis_monitor::{DeploymentSlot, InferenceObservation, MonitorConfig};
//! use aegis_anticipation::RiskLevel;
//!
//! let slot = DeploymentSlot::new(MonitorConfig::default())?;
//! slot.deploy("resnet18-cifar10")?;
//!
//! let outcome = slot.observe_inference(InferenceObservation::new(0.5, 0.1, 0.93))?;
//! assert_eq!(outcome.risk_level(), RiskLevel::Stable);
//! # Ok::<(), aegis_monitor::MonitorError>(())
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod deployment;
pub mod error;
pub mod outcome;
pub mod signals;

pub use config::{
    AdmissionConfig, MonitorConfig, MonitorProfile, DEFAULT_EVENT_CAPACITY,
    DEFAULT_MIN_CONFIDENCE,
};
pub use context::{DeploymentId, DeploymentInfo, MonitoringContext};
pub use deployment::{DeploymentSlot, MonitorEvent};
pub use error::{MonitorError, MonitorResult};
pub use outcome::{MonitoringOutcome, ObservationKind};
pub use signals::{
    entropy_drift, EpochSignals, InferenceObservation, Reading, ResolvedSignals, SignalReading,
    UpstreamFailure, NEUTRAL_SIGNAL,
};
