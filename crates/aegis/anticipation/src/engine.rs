//! Failure anticipation engine: violations in, risk verdict out.
//!
//! Rules are evaluated in a fixed order. Later rules only escalate, except
//! the compound drift + entropy rule which always forces the highest level.
//!
//! | # | Condition                    | Level              | Token                 |
//! |---|------------------------------|--------------------|-----------------------|
//! | 1 | `gradient_norm` violated     | `Pre-Failure Risk` | `Sensitivity Spike`   |
//! | 2 | `drift` violated             | at least `Warning` | `Distribution Drift`  |
//! | 3 | `drift` and `entropy` violated | `Pre-Failure Risk` | `Confidence Collapse` |

use aegis_policy::{SignalKey, SignalVector};
use tracing::trace;

use crate::risk::{RiskAssessment, RiskLevel};
use crate::trace::{CausalFactor, CausalTrace};

/// Score scale applied to raw entropy + drift while stable.
const STABLE_SCALE: f64 = 0.1;
const WARNING_BASE: f64 = 0.5;
const WARNING_PER_VIOLATION: f64 = 0.1;
const PRE_FAILURE_BASE: f64 = 0.8;
const PRE_FAILURE_PER_VIOLATION: f64 = 0.05;
const MAX_SCORE: f64 = 1.0;

/// Stateless rule-based classifier.
///
/// Identical inputs always produce identical outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureAnticipationEngine;

impl FailureAnticipationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Classify a violation set.
    ///
    /// `metrics` supplies raw values for the stable-score baseline; missing
    /// keys read as zero. `violations` is usually the output of
    /// [`AdaptivePolicy::check_violation`](aegis_policy::AdaptivePolicy::check_violation).
    pub fn assess_risk(&self, metrics: &SignalVector, violations: &[SignalKey]) -> RiskAssessment {
        let violated = |key: SignalKey| violations.contains(&key);

        let mut risk = RiskLevel::Stable;
        let mut causal_trace = CausalTrace::new();

        if violated(SignalKey::GradientNorm) {
            risk = RiskLevel::PreFailureRisk;
            causal_trace.push(CausalFactor::SensitivitySpike);
        }

        if violated(SignalKey::Drift) {
            risk = risk.escalate(RiskLevel::Warning);
            causal_trace.push(CausalFactor::DistributionDrift);
        }

        if violated(SignalKey::Drift) && violated(SignalKey::Entropy) {
            risk = RiskLevel::PreFailureRisk;
            causal_trace.push(CausalFactor::ConfidenceCollapse);
        }

        let fai_score = score(risk, metrics, violations.len());

        trace!(
            risk = %risk,
            fai_score,
            violations = violations.len(),
            "risk assessed"
        );

        RiskAssessment {
            risk_level: risk,
            fai_score,
            causal_trace,
        }
    }
}

/// Failure anticipation index for the final level, capped at 1.0.
fn score(risk: RiskLevel, metrics: &SignalVector, violation_count: usize) -> f64 {
    let raw = match risk {
        RiskLevel::Stable => {
            STABLE_SCALE
                * (metrics.value_or_zero(SignalKey::Entropy)
                    + metrics.value_or_zero(SignalKey::Drift))
        }
        RiskLevel::Warning => WARNING_BASE + WARNING_PER_VIOLATION * violation_count as f64,
        RiskLevel::PreFailureRisk => {
            PRE_FAILURE_BASE + PRE_FAILURE_PER_VIOLATION * violation_count as f64
        }
    };
    raw.min(MAX_SCORE)
}
