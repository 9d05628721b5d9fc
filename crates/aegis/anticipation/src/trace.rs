//! Causal trace: which anticipation rules fired, in order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Explanation used when no rule fired.
pub const NOMINAL_TRACE: &str = "Signals within adaptive bounds.";

/// Separator between trace tokens.
pub const TRACE_SEPARATOR: &str = " \u{2192} ";

/// A rendered trace contained a token that names no known factor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown causal factor: {0}")]
pub struct TraceParseError(pub String);

/// A single explanation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CausalFactor {
    /// Pseudo-label gradient norm exceeded its bound.
    SensitivitySpike,
    /// Input drift exceeded its bound.
    DistributionDrift,
    /// Drift and entropy exceeded their bounds together.
    ConfidenceCollapse,
}

impl CausalFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            CausalFactor::SensitivitySpike => "Sensitivity Spike",
            CausalFactor::DistributionDrift => "Distribution Drift",
            CausalFactor::ConfidenceCollapse => "Confidence Collapse",
        }
    }
}

impl fmt::Display for CausalFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CausalFactor {
    type Err = TraceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sensitivity Spike" => Ok(CausalFactor::SensitivitySpike),
            "Distribution Drift" => Ok(CausalFactor::DistributionDrift),
            "Confidence Collapse" => Ok(CausalFactor::ConfidenceCollapse),
            other => Err(TraceParseError(other.to_string())),
        }
    }
}

/// Ordered list of fired rules.
///
/// Renders and serializes as a single string: the tokens joined by
/// `" → "`, or [`NOMINAL_TRACE`] when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CausalTrace {
    factors: Vec<CausalFactor>,
}

impl CausalTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, factor: CausalFactor) {
        self.factors.push(factor);
    }

    pub fn factors(&self) -> &[CausalFactor] {
        &self.factors
    }

    pub fn contains(&self, factor: CausalFactor) -> bool {
        self.factors.contains(&factor)
    }

    /// Whether no rule fired.
    pub fn is_nominal(&self) -> bool {
        self.factors.is_empty()
    }
}

impl fmt::Display for CausalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return f.write_str(NOMINAL_TRACE);
        }
        for (i, factor) in self.factors.iter().enumerate() {
            if i > 0 {
                f.write_str(TRACE_SEPARATOR)?;
            }
            f.write_str(factor.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for CausalTrace {
    type Err = TraceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NOMINAL_TRACE {
            return Ok(CausalTrace::new());
        }
        let factors = s
            .split(TRACE_SEPARATOR)
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CausalTrace { factors })
    }
}

impl Serialize for CausalTrace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CausalTrace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
