//! Policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Construction-time settings for an [`AdaptivePolicy`](crate::AdaptivePolicy).
///
/// Both values are fixed for the lifetime of a policy; changing them means
/// building a new policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Number of most recent samples kept per signal.
    pub window_size: usize,

    /// Threshold width in standard deviations above the mean.
    pub sensitivity_sigma: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            window_size: crate::DEFAULT_WINDOW_SIZE,
            sensitivity_sigma: crate::DEFAULT_SENSITIVITY_SIGMA,
        }
    }
}

impl PolicyConfig {
    /// Config with explicit values, validated.
    pub fn new(window_size: usize, sensitivity_sigma: f64) -> PolicyResult<Self> {
        let config = Self {
            window_size,
            sensitivity_sigma,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that both settings are usable.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.window_size == 0 {
            return Err(PolicyError::InvalidWindowSize(self.window_size));
        }
        if !self.sensitivity_sigma.is_finite() || self.sensitivity_sigma <= 0.0 {
            return Err(PolicyError::InvalidSensitivity(self.sensitivity_sigma));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = PolicyConfig::default();
        assert_eq!(cfg.window_size, 50);
        assert_eq!(cfg.sensitivity_sigma, 3.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert_eq!(
            PolicyConfig::new(0, 3.0),
            Err(PolicyError::InvalidWindowSize(0))
        );
        assert_eq!(
            PolicyConfig::new(10, 0.0),
            Err(PolicyError::InvalidSensitivity(0.0))
        );
        assert!(PolicyConfig::new(10, f64::NAN).is_err());
        assert!(PolicyConfig::new(10, f64::INFINITY).is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: PolicyConfig = serde_json::from_str(r#"{"window_size": 20}"#).unwrap();
        assert_eq!(cfg.window_size, 20);
        assert_eq!(cfg.sensitivity_sigma, 3.0);
    }
}
