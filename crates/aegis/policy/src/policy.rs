//! Adaptive policy: self-adjusting upper bounds for tracked signals.
//!
//! Each tracked signal keeps a [`SignalWindow`] of its most recent values.
//! Until a window holds more than [`MIN_SAMPLES_FOR_BASELINE`] samples the
//! signal is judged against its cold-start default; afterwards its baseline
//! is re-derived from the window on every update. Thresholds are
//! `mean + sigma * std`.
//!
//! The window is a trailing estimator: sustained anomalies that keep being
//! fed into `update` pull the baseline up with them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::PolicyConfig;
use crate::error::PolicyResult;
use crate::signal::{SignalKey, SignalVector};
use crate::window::{Baseline, SignalWindow};
use crate::MIN_SAMPLES_FOR_BASELINE;

/// Current upper bound per tracked signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds(BTreeMap<SignalKey, f64>);

impl Thresholds {
    pub fn get(&self, key: SignalKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Streaming estimator of "normal" for the tracked signals of one deployed model.
#[derive(Debug, Clone)]
pub struct AdaptivePolicy {
    config: PolicyConfig,
    windows: BTreeMap<SignalKey, SignalWindow>,
    baselines: BTreeMap<SignalKey, Baseline>,
}

impl AdaptivePolicy {
    /// Create a policy from a validated configuration.
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a policy with the default window (50) and sensitivity (3σ).
    pub fn with_defaults() -> Self {
        Self::build(PolicyConfig::default())
    }

    fn build(config: PolicyConfig) -> Self {
        let windows = SignalKey::ALL
            .iter()
            .map(|k| (*k, SignalWindow::new(config.window_size)))
            .collect();
        let baselines = SignalKey::ALL
            .iter()
            .map(|k| (*k, k.cold_start_baseline()))
            .collect();

        Self {
            config,
            windows,
            baselines,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Feed new observations into the windows.
    ///
    /// Unknown names are ignored and missing keys are skipped. A key whose
    /// window holds more than five samples afterwards has its baseline
    /// replaced by the window's mean and population std.
    pub fn update(&mut self, metrics: &SignalVector) {
        for (key, value) in metrics.tracked() {
            let Some(window) = self.windows.get_mut(&key) else {
                continue;
            };
            let evicted = window.push(value);
            trace!(signal = %key, value, ?evicted, window_len = window.len(), "sample appended");

            if window.len() > MIN_SAMPLES_FOR_BASELINE {
                if let Some(baseline) = window.baseline() {
                    if window.len() == MIN_SAMPLES_FOR_BASELINE + 1 {
                        debug!(
                            signal = %key,
                            mean = baseline.mean,
                            std = baseline.std,
                            "baseline established from window"
                        );
                    }
                    self.baselines.insert(key, baseline);
                }
            }
        }
    }

    /// Upper bound `mean + sigma * std` for every tracked key.
    pub fn thresholds(&self) -> Thresholds {
        let sigma = self.config.sensitivity_sigma;
        Thresholds(
            self.baselines
                .iter()
                .map(|(k, b)| (*k, b.upper_bound(sigma)))
                .collect(),
        )
    }

    /// Tracked keys whose value exceeds the current threshold, in the
    /// order they appear in `metrics`.
    pub fn check_violation(&self, metrics: &SignalVector) -> Vec<SignalKey> {
        let thresholds = self.thresholds();
        metrics
            .tracked()
            .filter(|(key, value)| {
                thresholds
                    .get(*key)
                    .map(|limit| *value > limit)
                    .unwrap_or(false)
            })
            .map(|(key, _)| key)
            .collect()
    }

    /// Current baseline for a key.
    pub fn baseline(&self, key: SignalKey) -> Baseline {
        self.baselines
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.cold_start_baseline())
    }

    /// Window for a key.
    pub fn window(&self, key: SignalKey) -> Option<&SignalWindow> {
        self.windows.get(&key)
    }

    /// Number of samples currently held for a key.
    pub fn sample_count(&self, key: SignalKey) -> usize {
        self.windows.get(&key).map(|w| w.len()).unwrap_or(0)
    }

    /// Whether the key's baseline is derived from data rather than defaults.
    pub fn is_warmed_up(&self, key: SignalKey) -> bool {
        self.sample_count(key) > MIN_SAMPLES_FOR_BASELINE
    }
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}
