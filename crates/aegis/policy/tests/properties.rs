//! Property tests for the adaptive policy's window and threshold invariants.

use aegis_policy::{AdaptivePolicy, PolicyConfig, SignalKey, SignalVector};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = SignalKey> {
    prop_oneof![
        Just(SignalKey::Entropy),
        Just(SignalKey::GradientNorm),
        Just(SignalKey::Drift),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<(SignalKey, f64)>> {
    prop::collection::vec((arb_key(), 0.0f64..10.0), 0..120)
}

fn replay(config: PolicyConfig, history: &[(SignalKey, f64)]) -> AdaptivePolicy {
    let mut policy = AdaptivePolicy::new(config).unwrap();
    for (key, value) in history {
        policy.update(&SignalVector::new().with_key(*key, *value));
    }
    policy
}

proptest! {
    /// The window never grows past its capacity and keeps exactly the most recent values.
    #[test]
    fn window_keeps_most_recent_values(
        window_size in 1usize..30,
        values in prop::collection::vec(-5.0f64..5.0, 0..100),
    ) {
        let config = PolicyConfig::new(window_size, 3.0).unwrap();
        let history: Vec<(SignalKey, f64)> =
            values.iter().map(|v| (SignalKey::Drift, *v)).collect();
        let policy = replay(config, &history);

        let window = policy.window(SignalKey::Drift).unwrap();
        prop_assert!(window.len() <= window_size);

        let expected: Vec<f64> = values
            .iter()
            .copied()
            .skip(values.len().saturating_sub(window_size))
            .collect();
        prop_assert_eq!(window.iter().collect::<Vec<_>>(), expected);
    }

    /// Standard deviation stays strictly positive whatever the history.
    #[test]
    fn std_is_always_positive(history in arb_history()) {
        let policy = replay(PolicyConfig::default(), &history);
        for key in SignalKey::ALL {
            prop_assert!(policy.baseline(key).std > 0.0);
        }
    }

    /// Reading thresholds twice without an update returns identical values.
    #[test]
    fn thresholds_are_idempotent(history in arb_history()) {
        let policy = replay(PolicyConfig::default(), &history);
        prop_assert_eq!(policy.thresholds(), policy.thresholds());
    }

    /// Doubling sigma never lowers a threshold for a fixed history.
    #[test]
    fn wider_sigma_never_lowers_thresholds(
        sigma in 0.1f64..6.0,
        history in arb_history(),
    ) {
        let narrow = replay(PolicyConfig::new(50, sigma).unwrap(), &history);
        let wide = replay(PolicyConfig::new(50, sigma * 2.0).unwrap(), &history);

        let narrow = narrow.thresholds();
        let wide = wide.thresholds();
        for key in SignalKey::ALL {
            prop_assert!(wide.get(key).unwrap() > narrow.get(key).unwrap());
        }
    }

    /// Every reported violation really exceeds its threshold.
    #[test]
    fn violations_exceed_thresholds(
        history in arb_history(),
        entropy in 0.0f64..10.0,
        gradient_norm in 0.0f64..10.0,
        drift in 0.0f64..10.0,
    ) {
        let policy = replay(PolicyConfig::default(), &history);
        let metrics = SignalVector::new()
            .with_key(SignalKey::Entropy, entropy)
            .with_key(SignalKey::GradientNorm, gradient_norm)
            .with_key(SignalKey::Drift, drift);

        let thresholds = policy.thresholds();
        let violations = policy.check_violation(&metrics);
        for key in SignalKey::ALL {
            let over = metrics.value(key).unwrap() > thresholds.get(key).unwrap();
            prop_assert_eq!(violations.contains(&key), over);
        }
    }
}
