//! Property tests: score bounds and monotonicity of the anticipation rules.

use aegis_anticipation::{FailureAnticipationEngine, RiskLevel};
use aegis_policy::{SignalKey, SignalVector};
use proptest::prelude::*;

fn arb_violations() -> impl Strategy<Value = Vec<SignalKey>> {
    prop::sample::subsequence(SignalKey::ALL.to_vec(), 0..=3).prop_shuffle()
}

fn arb_metrics() -> impl Strategy<Value = SignalVector> {
    (0.0f64..50.0, 0.0f64..50.0, 0.0f64..50.0).prop_map(|(e, g, d)| {
        SignalVector::new()
            .with_key(SignalKey::Entropy, e)
            .with_key(SignalKey::GradientNorm, g)
            .with_key(SignalKey::Drift, d)
    })
}

proptest! {
    /// The FAI score always lands in [0, 1].
    #[test]
    fn score_is_bounded(metrics in arb_metrics(), violations in arb_violations()) {
        let verdict = FailureAnticipationEngine::new().assess_risk(&metrics, &violations);
        prop_assert!(verdict.fai_score >= 0.0);
        prop_assert!(verdict.fai_score <= 1.0);
    }

    /// Adding a gradient violation never lowers the risk level.
    #[test]
    fn gradient_violation_is_monotone(
        metrics in arb_metrics(),
        violations in arb_violations(),
    ) {
        let engine = FailureAnticipationEngine::new();
        let without: Vec<SignalKey> = violations
            .iter()
            .copied()
            .filter(|k| *k != SignalKey::GradientNorm)
            .collect();
        let mut with = without.clone();
        with.push(SignalKey::GradientNorm);

        let base = engine.assess_risk(&metrics, &without);
        let escalated = engine.assess_risk(&metrics, &with);
        prop_assert!(escalated.risk_level >= base.risk_level);
        prop_assert_eq!(escalated.risk_level, RiskLevel::PreFailureRisk);
    }

    /// Identical inputs give identical verdicts.
    #[test]
    fn engine_is_deterministic(metrics in arb_metrics(), violations in arb_violations()) {
        let engine = FailureAnticipationEngine::new();
        prop_assert_eq!(
            engine.assess_risk(&metrics, &violations),
            engine.assess_risk(&metrics, &violations)
        );
    }

    /// A trace is nominal exactly when the verdict is stable.
    #[test]
    fn nominal_trace_iff_stable(metrics in arb_metrics(), violations in arb_violations()) {
        let verdict = FailureAnticipationEngine::new().assess_risk(&metrics, &violations);
        prop_assert_eq!(verdict.causal_trace.is_nominal(), verdict.is_stable());
    }
}
