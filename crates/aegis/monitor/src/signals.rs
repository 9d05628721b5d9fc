//! Signal readings at the monitoring boundary.
//!
//! Upstream extractors hand over raw floats, or a typed failure when a
//! signal could not be computed. Failures resolve to a neutral `0.0` and are
//! recorded; non-finite values are rejected before they reach the policy.

use aegis_policy::{SignalKey, SignalVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{MonitorError, MonitorResult};

/// Value substituted for a signal whose computation failed.
pub const NEUTRAL_SIGNAL: f64 = 0.0;

/// A signal could not be computed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("upstream computation failed: {reason}")]
pub struct UpstreamFailure {
    pub reason: String,
}

impl UpstreamFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// One reading: a computed value or the reason it is missing.
pub type Reading = Result<f64, UpstreamFailure>;

/// Named readings in insertion order, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalReading {
    entries: Vec<(String, Reading)>,
}

impl SignalReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading. A repeated key replaces the earlier reading.
    pub fn with(mut self, key: impl Into<String>, reading: Reading) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = reading,
            None => self.entries.push((key, reading)),
        }
        self
    }

    pub fn with_value(self, key: impl Into<String>, value: f64) -> Self {
        self.with(key, Ok(value))
    }

    pub fn with_failure(self, key: impl Into<String>, reason: impl Into<String>) -> Self {
        self.with(key, Err(UpstreamFailure::new(reason)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate computed values and substitute neutral values for failures.
    pub fn resolve(self) -> MonitorResult<ResolvedSignals> {
        let mut vector = SignalVector::new();
        let mut substituted = Vec::new();

        for (key, reading) in self.entries {
            match reading {
                Ok(value) if !value.is_finite() => {
                    return Err(MonitorError::NonFiniteSignal { key, value });
                }
                Ok(value) => vector.insert(key, value),
                Err(_) => {
                    vector.insert(key.clone(), NEUTRAL_SIGNAL);
                    substituted.push(key);
                }
            }
        }

        Ok(ResolvedSignals {
            vector,
            substituted,
        })
    }
}

/// Validated signals ready for the policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSignals {
    pub vector: SignalVector,

    /// Keys whose value is a neutral substitute, in reading order.
    pub substituted: Vec<String>,
}

impl ResolvedSignals {
    /// Whether every signal was computed.
    pub fn is_complete(&self) -> bool {
        self.substituted.is_empty()
    }
}

/// Per-epoch research signals from the training-time extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochSignals {
    pub gradient_norm: f64,
    pub gradient_variance: f64,
    pub loss_curvature: f64,
    pub prediction_entropy: f64,
    pub dead_neuron_ratio: f64,
    pub latent_drift: f64,
    pub accuracy: f64,
}

impl EpochSignals {
    /// Tracked signals first under their policy names, then the rest.
    pub fn to_signal_vector(&self) -> SignalVector {
        self.untracked()
            .into_iter()
            .fold(self.tracked_vector(), |v, (name, value)| v.with(name, value))
    }

    /// Same layout as [`to_signal_vector`](Self::to_signal_vector), unvalidated.
    pub fn reading(&self) -> SignalReading {
        self.to_signal_vector()
            .iter()
            .fold(SignalReading::new(), |r, (name, value)| r.with_value(name, value))
    }

    fn tracked_vector(&self) -> SignalVector {
        SignalVector::new()
            .with_key(SignalKey::Entropy, self.prediction_entropy)
            .with_key(SignalKey::GradientNorm, self.gradient_norm)
            .with_key(SignalKey::Drift, self.latent_drift)
    }

    fn untracked(&self) -> [(&'static str, f64); 4] {
        [
            ("gradient_variance", self.gradient_variance),
            ("loss_curvature", self.loss_curvature),
            ("dead_neuron_ratio", self.dead_neuron_ratio),
            ("accuracy", self.accuracy),
        ]
    }
}

/// One served prediction's signals.
///
/// Drift is not supplied: the monitoring context derives it from entropy.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceObservation {
    pub entropy: Reading,
    pub gradient_norm: Reading,

    /// Top-class probability, if known.
    pub confidence: Option<f64>,
}

impl InferenceObservation {
    pub fn new(entropy: f64, gradient_norm: f64, confidence: f64) -> Self {
        Self {
            entropy: Ok(entropy),
            gradient_norm: Ok(gradient_norm),
            confidence: Some(confidence),
        }
    }

    pub fn from_readings(entropy: Reading, gradient_norm: Reading, confidence: Option<f64>) -> Self {
        Self {
            entropy,
            gradient_norm,
            confidence,
        }
    }

    /// Confidence must be a probability when present.
    pub fn validate_confidence(&self) -> MonitorResult<()> {
        match self.confidence {
            Some(c) if !c.is_finite() || !(0.0..=1.0).contains(&c) => {
                Err(MonitorError::InvalidConfidence(c))
            }
            _ => Ok(()),
        }
    }
}

/// Drift proxy: relative distance of `entropy` from the running mean.
///
/// Zero while the mean is not positive.
pub fn entropy_drift(entropy: f64, running_mean: f64) -> f64 {
    if running_mean > 0.0 {
        (entropy - running_mean).abs() / running_mean
    } else {
        0.0
    }
}
