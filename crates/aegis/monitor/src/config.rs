//! Monitor configuration.
//!
//! Policy window settings, the admission gate for inference observations,
//! and event channel sizing.

use aegis_policy::PolicyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};

/// Confidence an inference must exceed before it may move the baseline.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;

/// Buffered events per subscriber before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Deployment profile used to derive sensible defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorProfile {
    /// Standard production serving.
    Production,
    /// Exploratory runs: short memory, ungated learning.
    Research,
    /// Safety-critical serving: long memory, tight bounds, clean-only learning.
    Strict,
}

/// Top-level configuration for a monitoring context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sliding window and sensitivity.
    pub policy: PolicyConfig,

    /// Which inference observations may update the baseline.
    pub admission: AdmissionConfig,

    /// Capacity of the deployment event channel.
    pub event_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            admission: AdmissionConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl MonitorConfig {
    /// Create config tuned for a deployment profile.
    pub fn for_profile(profile: MonitorProfile) -> Self {
        let mut config = Self::default();

        match profile {
            MonitorProfile::Production => {}
            MonitorProfile::Research => {
                config.policy.window_size = 20;
                config.admission.min_confidence = None;
            }
            MonitorProfile::Strict => {
                config.policy.window_size = 200;
                config.policy.sensitivity_sigma = 2.0;
                config.admission.min_confidence = Some(0.9);
                config.admission.reject_violating = true;
            }
        }

        config
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> MonitorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MonitorResult<()> {
        self.policy.validate()?;
        self.admission.validate()?;
        if self.event_capacity == 0 {
            return Err(MonitorError::InvalidConfig(
                "event_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Gate applied before an inference observation updates the baseline.
///
/// Epoch observations bypass the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Confidence must be strictly greater than this. `None` admits every
    /// observation regardless of confidence.
    pub min_confidence: Option<f64>,

    /// Skip the update when the observation already violates the current
    /// thresholds, so sustained shifts are not absorbed into the baseline.
    pub reject_violating: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_confidence: Some(DEFAULT_MIN_CONFIDENCE),
            reject_violating: false,
        }
    }
}

impl AdmissionConfig {
    pub fn validate(&self) -> MonitorResult<()> {
        if let Some(min) = self.min_confidence {
            if !min.is_finite() || !(0.0..=1.0).contains(&min) {
                return Err(MonitorError::InvalidConfig(format!(
                    "min_confidence must be within [0.0, 1.0], got {}",
                    min
                )));
            }
        }
        Ok(())
    }

    /// Whether an observation with this confidence passes the gate.
    ///
    /// Unknown confidence only passes when the gate is disabled.
    pub fn admits(&self, confidence: Option<f64>) -> bool {
        match (self.min_confidence, confidence) {
            (None, _) => true,
            (Some(min), Some(c)) => c > min,
            (Some(_), None) => false,
        }
    }
}
