//! Risk levels and the assessment record produced by the engine.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trace::CausalTrace;

/// Qualitative failure risk of a deployed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Signals within adaptive bounds.
    Stable,
    /// Moderate concern; the model may still be calibrated.
    Warning,
    /// Compound or structural instability; failure is likely ahead.
    #[serde(rename = "Pre-Failure Risk")]
    PreFailureRisk,
}

impl RiskLevel {
    /// Explicit severity rank. Ordering between levels is defined by this
    /// rank alone, never by declaration order.
    pub fn severity(&self) -> u8 {
        match self {
            RiskLevel::Stable => 0,
            RiskLevel::Warning => 1,
            RiskLevel::PreFailureRisk => 2,
        }
    }

    /// The more severe of two levels.
    pub fn escalate(self, other: RiskLevel) -> RiskLevel {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Stable => "Stable",
            RiskLevel::Warning => "Warning",
            RiskLevel::PreFailureRisk => "Pre-Failure Risk",
        }
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Qualitative risk.
    pub risk_level: RiskLevel,

    /// Failure anticipation index in `[0.0, 1.0]`.
    pub fai_score: f64,

    /// Rules that fired, in firing order.
    pub causal_trace: CausalTrace,
}

impl RiskAssessment {
    pub fn is_stable(&self) -> bool {
        self.risk_level == RiskLevel::Stable
    }

    /// Whether the verdict is the highest level.
    pub fn is_pre_failure(&self) -> bool {
        self.risk_level == RiskLevel::PreFailureRisk
    }
}
