//! Per-observation result handed back to the caller.

use aegis_anticipation::{RiskAssessment, RiskLevel};
use aegis_policy::{SignalKey, SignalVector, Thresholds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::DeploymentId;

/// Source of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Training-time epoch summary.
    Epoch,
    /// Single served prediction.
    Inference,
}

/// Everything needed to persist or audit one observation.
///
/// Thresholds are the ones the observation was judged against, captured
/// under the same lock as the update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringOutcome {
    pub deployment_id: DeploymentId,
    pub observed_at: DateTime<Utc>,
    pub kind: ObservationKind,

    /// Resolved signals, substitutes included.
    pub metrics: SignalVector,

    pub violations: Vec<SignalKey>,
    pub thresholds: Thresholds,
    pub assessment: RiskAssessment,

    /// Level of the same deployment's preceding observation, read and
    /// replaced under the lock that produced this outcome.
    pub previous_risk_level: RiskLevel,

    /// Whether the observation was admitted into the baseline windows.
    pub baseline_updated: bool,

    /// Signals replaced by a neutral value.
    pub substituted: Vec<String>,
}

impl MonitoringOutcome {
    pub fn risk_level(&self) -> RiskLevel {
        self.assessment.risk_level
    }

    pub fn is_violating(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Whether the verdict differs from the preceding observation's.
    pub fn risk_changed(&self) -> bool {
        self.previous_risk_level != self.assessment.risk_level
    }
}
