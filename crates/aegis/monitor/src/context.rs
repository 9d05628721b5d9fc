//! Monitoring context: one deployed model's policy and engine.
//!
//! Update, violation check, threshold snapshot and the risk verdict run
//! under a single lock, so concurrent observations never see a half-applied
//! update and risk transitions are recorded in the order they happened.

use std::fmt;
use std::mem;
use std::sync::{Mutex, MutexGuard};

use aegis_anticipation::{FailureAnticipationEngine, RiskLevel};
use aegis_policy::{AdaptivePolicy, Baseline, SignalKey, Thresholds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::{AdmissionConfig, MonitorConfig};
use crate::error::{MonitorError, MonitorResult};
use crate::outcome::{MonitoringOutcome, ObservationKind};
use crate::signals::{
    entropy_drift, EpochSignals, InferenceObservation, Reading, ResolvedSignals, SignalReading,
    UpstreamFailure,
};

/// Identity of one model deployment. A redeploy of the same model gets a
/// new id, so outcomes from retired contexts never alias the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(Uuid);

impl DeploymentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// What was deployed, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub id: DeploymentId,
    pub model_name: String,
    pub deployed_at: DateTime<Utc>,
}

impl DeploymentInfo {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            id: DeploymentId::generate(),
            model_name: model_name.into(),
            deployed_at: Utc::now(),
        }
    }
}

/// Mutable state guarded by the context lock.
#[derive(Debug)]
struct MonitorState {
    policy: AdaptivePolicy,

    /// Verdict of the most recent observation; `Stable` before the first.
    last_risk: RiskLevel,
}

/// Adaptive policy and anticipation engine scoped to one deployment.
///
/// Shared behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct MonitoringContext {
    deployment: DeploymentInfo,
    admission: AdmissionConfig,
    engine: FailureAnticipationEngine,
    state: Mutex<MonitorState>,
}

impl MonitoringContext {
    /// Fresh context with cold-start baselines.
    pub fn new(deployment: DeploymentInfo, config: &MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        let policy = AdaptivePolicy::new(config.policy.clone())?;

        Ok(Self {
            deployment,
            admission: config.admission.clone(),
            engine: FailureAnticipationEngine::new(),
            state: Mutex::new(MonitorState {
                policy,
                last_risk: RiskLevel::Stable,
            }),
        })
    }

    pub fn deployment(&self) -> &DeploymentInfo {
        &self.deployment
    }

    pub fn id(&self) -> DeploymentId {
        self.deployment.id
    }

    /// Record one training epoch. Epochs always update the baseline.
    #[instrument(skip(self, signals), fields(deployment = %self.deployment.id))]
    pub fn observe_epoch(&self, signals: &EpochSignals) -> MonitorResult<MonitoringOutcome> {
        let resolved = signals.reading().resolve()?;

        let mut state = self.lock()?;
        state.policy.update(&resolved.vector);
        let violations = state.policy.check_violation(&resolved.vector);
        let thresholds = state.policy.thresholds();

        Ok(self.conclude(
            &mut state,
            ObservationKind::Epoch,
            resolved,
            violations,
            thresholds,
            true,
        ))
    }

    /// Record one served prediction.
    ///
    /// Drift is derived from the entropy baseline mean before the update.
    /// The observation moves the baseline only when it passes the admission
    /// gate and none of its signals were substituted.
    #[instrument(skip(self, observation), fields(deployment = %self.deployment.id))]
    pub fn observe_inference(
        &self,
        observation: InferenceObservation,
    ) -> MonitorResult<MonitoringOutcome> {
        observation.validate_confidence()?;
        let confidence = observation.confidence;

        let mut state = self.lock()?;

        let running_mean = state.policy.baseline(SignalKey::Entropy).mean;
        let drift: Reading = match &observation.entropy {
            Ok(entropy) => Ok(entropy_drift(*entropy, running_mean)),
            Err(_) => Err(UpstreamFailure::new("derived from unavailable entropy")),
        };

        let resolved = SignalReading::new()
            .with(SignalKey::Entropy.as_str(), observation.entropy)
            .with(SignalKey::GradientNorm.as_str(), observation.gradient_norm)
            .with(SignalKey::Drift.as_str(), drift)
            .resolve()?;

        let admitted = self.admit(&state.policy, &resolved, confidence);
        if admitted {
            state.policy.update(&resolved.vector);
        }
        let violations = state.policy.check_violation(&resolved.vector);
        let thresholds = state.policy.thresholds();

        Ok(self.conclude(
            &mut state,
            ObservationKind::Inference,
            resolved,
            violations,
            thresholds,
            admitted,
        ))
    }

    /// Current thresholds.
    pub fn thresholds(&self) -> MonitorResult<Thresholds> {
        Ok(self.lock()?.policy.thresholds())
    }

    pub fn baseline(&self, key: SignalKey) -> MonitorResult<Baseline> {
        Ok(self.lock()?.policy.baseline(key))
    }

    pub fn sample_count(&self, key: SignalKey) -> MonitorResult<usize> {
        Ok(self.lock()?.policy.sample_count(key))
    }

    /// Risk level of the latest observation.
    pub fn last_risk_level(&self) -> MonitorResult<RiskLevel> {
        Ok(self.lock()?.last_risk)
    }

    fn lock(&self) -> MonitorResult<MutexGuard<'_, MonitorState>> {
        self.state.lock().map_err(|_| MonitorError::LockError)
    }

    fn admit(
        &self,
        policy: &AdaptivePolicy,
        resolved: &ResolvedSignals,
        confidence: Option<f64>,
    ) -> bool {
        if !self.admission.admits(confidence) {
            debug!(?confidence, "below confidence gate, baseline unchanged");
            return false;
        }
        if !resolved.is_complete() {
            debug!(substituted = ?resolved.substituted, "substituted signals, baseline unchanged");
            return false;
        }
        if self.admission.reject_violating {
            let pending = policy.check_violation(&resolved.vector);
            if !pending.is_empty() {
                debug!(violations = ?pending, "violating observation, baseline unchanged");
                return false;
            }
        }
        true
    }

    /// Assess and record the verdict. Called with the state lock held.
    fn conclude(
        &self,
        state: &mut MonitorState,
        kind: ObservationKind,
        resolved: ResolvedSignals,
        violations: Vec<SignalKey>,
        thresholds: Thresholds,
        baseline_updated: bool,
    ) -> MonitoringOutcome {
        let ResolvedSignals {
            vector: metrics,
            substituted,
        } = resolved;

        if !substituted.is_empty() {
            warn!(?substituted, "neutral values substituted for failed signals");
        }

        let assessment = self.engine.assess_risk(&metrics, &violations);
        if assessment.is_pre_failure() {
            warn!(
                fai_score = assessment.fai_score,
                trace = %assessment.causal_trace,
                "pre-failure risk detected"
            );
        }
        let previous_risk_level = mem::replace(&mut state.last_risk, assessment.risk_level);

        MonitoringOutcome {
            deployment_id: self.deployment.id,
            observed_at: Utc::now(),
            kind,
            metrics,
            violations,
            thresholds,
            assessment,
            previous_risk_level,
            baseline_updated,
            substituted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: MonitorConfig) -> MonitoringContext {
        MonitoringContext::new(DeploymentInfo::new("resnet-test"), &config).unwrap()
    }

    fn warm_epochs(ctx: &MonitoringContext, n: usize) {
        for i in 0..n {
            let jitter = (i % 3) as f64 * 0.01;
            let epoch = EpochSignals {
                gradient_norm: 1.0 + jitter,
                prediction_entropy: 0.5 + jitter,
                latent_drift: 0.02 + jitter,
                accuracy: 0.9,
                ..Default::default()
            };
            ctx.observe_epoch(&epoch).unwrap();
        }
    }

    #[test]
    fn cold_start_thresholds() {
        let ctx = context(MonitorConfig::default());
        let thresholds = ctx.thresholds().unwrap();
        assert!((thresholds.get(SignalKey::Entropy).unwrap() - 0.8).abs() < 1e-12);
        assert!((thresholds.get(SignalKey::GradientNorm).unwrap() - 1.6).abs() < 1e-12);
        assert!((thresholds.get(SignalKey::Drift).unwrap() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn epochs_always_update() {
        let ctx = context(MonitorConfig::default());
        warm_epochs(&ctx, 3);
        assert_eq!(ctx.sample_count(SignalKey::Entropy).unwrap(), 3);
        assert_eq!(ctx.sample_count(SignalKey::Drift).unwrap(), 3);
    }

    #[test]
    fn epoch_spike_is_pre_failure() {
        let ctx = context(MonitorConfig::default());
        warm_epochs(&ctx, 12);

        let spike = EpochSignals {
            gradient_norm: 40.0,
            prediction_entropy: 0.5,
            latent_drift: 0.02,
            ..Default::default()
        };
        let outcome = ctx.observe_epoch(&spike).unwrap();

        assert_eq!(outcome.kind, ObservationKind::Epoch);
        assert!(outcome.baseline_updated);
        assert_eq!(outcome.violations, vec![SignalKey::GradientNorm]);
        assert_eq!(outcome.risk_level(), RiskLevel::PreFailureRisk);
        assert_eq!(outcome.assessment.causal_trace.to_string(), "Sensitivity Spike");
    }

    #[test]
    fn low_confidence_does_not_update() {
        let ctx = context(MonitorConfig::default());
        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.4, 0.0, 0.6))
            .unwrap();

        assert!(!outcome.baseline_updated);
        assert_eq!(ctx.sample_count(SignalKey::Entropy).unwrap(), 0);
        assert_eq!(outcome.kind, ObservationKind::Inference);
    }

    #[test]
    fn confident_inference_updates() {
        let ctx = context(MonitorConfig::default());
        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.4, 0.0, 0.95))
            .unwrap();

        assert!(outcome.baseline_updated);
        assert_eq!(ctx.sample_count(SignalKey::Entropy).unwrap(), 1);
        assert_eq!(ctx.sample_count(SignalKey::Drift).unwrap(), 1);
    }

    #[test]
    fn drift_is_relative_to_entropy_baseline() {
        let ctx = context(MonitorConfig::default());
        // Cold-start entropy mean is 0.5.
        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.75, 0.0, 0.5))
            .unwrap();

        let drift = outcome.metrics.value(SignalKey::Drift).unwrap();
        assert!((drift - 0.5).abs() < 1e-12);
        assert_eq!(outcome.violations, vec![SignalKey::Drift]);
        assert_eq!(outcome.risk_level(), RiskLevel::Warning);
    }

    #[test]
    fn failed_entropy_substitutes_entropy_and_drift() {
        let ctx = context(MonitorConfig::default());
        let observation = InferenceObservation::from_readings(
            Err(UpstreamFailure::new("softmax overflow")),
            Ok(0.3),
            Some(0.99),
        );
        let outcome = ctx.observe_inference(observation).unwrap();

        assert_eq!(outcome.substituted, vec!["entropy".to_string(), "drift".to_string()]);
        assert_eq!(outcome.metrics.value(SignalKey::Entropy), Some(0.0));
        assert_eq!(outcome.metrics.value(SignalKey::Drift), Some(0.0));
        assert!(!outcome.baseline_updated);
        assert_eq!(outcome.risk_level(), RiskLevel::Stable);
    }

    #[test]
    fn rejects_bad_input_before_touching_state() {
        let ctx = context(MonitorConfig::default());
        assert!(matches!(
            ctx.observe_inference(InferenceObservation::new(f64::NAN, 0.0, 0.9)),
            Err(MonitorError::NonFiniteSignal { .. })
        ));
        assert!(matches!(
            ctx.observe_inference(InferenceObservation::new(0.4, 0.0, 2.0)),
            Err(MonitorError::InvalidConfidence(_))
        ));
        assert_eq!(ctx.sample_count(SignalKey::Entropy).unwrap(), 0);
    }

    #[test]
    fn reject_violating_keeps_baseline_clean() {
        let mut config = MonitorConfig::default();
        config.admission.min_confidence = None;
        config.admission.reject_violating = true;
        let ctx = context(config);

        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.5, 5.0, 0.9))
            .unwrap();
        assert_eq!(outcome.violations, vec![SignalKey::GradientNorm]);
        assert!(!outcome.baseline_updated);
        assert_eq!(ctx.sample_count(SignalKey::GradientNorm).unwrap(), 0);

        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.5, 1.0, 0.9))
            .unwrap();
        assert!(outcome.baseline_updated);
    }

    #[test]
    fn outcome_serializes_for_persistence() {
        let ctx = context(MonitorConfig::default());
        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.5, 0.0, 0.9))
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["kind"], "inference");
        assert_eq!(json["assessment"]["risk_level"], "Stable");
        assert_eq!(
            json["assessment"]["causal_trace"],
            "Signals within adaptive bounds."
        );
        assert!(json["thresholds"]["entropy"].is_number());
        assert!(json["metrics"]["drift"].is_number());
    }

    #[test]
    fn inference_outcome_fields_line_up() {
        let ctx = context(MonitorConfig::default());
        let outcome = ctx
            .observe_inference(InferenceObservation::new(0.5, 5.0, 0.9))
            .unwrap();

        assert_eq!(outcome.violations, vec![SignalKey::GradientNorm]);
        assert_eq!(outcome.metrics.value(SignalKey::GradientNorm), Some(5.0));
        assert!(outcome.thresholds.get(SignalKey::GradientNorm).unwrap() < 5.0);
        assert!(outcome.substituted.is_empty());
    }

    #[test]
    fn risk_transitions_are_recorded_per_context() {
        let ctx = context(MonitorConfig::default());
        assert_eq!(ctx.last_risk_level().unwrap(), RiskLevel::Stable);

        let spike = ctx
            .observe_inference(InferenceObservation::new(0.5, 5.0, 0.5))
            .unwrap();
        assert_eq!(spike.previous_risk_level, RiskLevel::Stable);
        assert!(spike.risk_changed());

        let again = ctx
            .observe_inference(InferenceObservation::new(0.5, 5.0, 0.5))
            .unwrap();
        assert_eq!(again.previous_risk_level, RiskLevel::PreFailureRisk);
        assert!(!again.risk_changed());

        let calm = ctx
            .observe_inference(InferenceObservation::new(0.5, 0.0, 0.5))
            .unwrap();
        assert_eq!(calm.previous_risk_level, RiskLevel::PreFailureRisk);
        assert_eq!(ctx.last_risk_level().unwrap(), RiskLevel::Stable);
    }

    #[test]
    fn deployment_id_displays_as_uuid() {
        let id = DeploymentId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::Value::String(id.to_string())
        );
    }
}
