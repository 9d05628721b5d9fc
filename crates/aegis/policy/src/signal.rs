//! Signal identifiers and ordered signal vectors.
//!
//! A [`SignalVector`] is what collaborators hand to the policy: a set of
//! named readings in the order they were produced. Only the names that
//! parse as a [`SignalKey`] are tracked; everything else rides along
//! untouched so callers can persist the full vector.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::window::Baseline;

// ── Signal keys ─────────────────────────────────────────────────────────

/// A label-free signal tracked by the adaptive policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKey {
    /// Mean Shannon entropy of the model's softmax output.
    Entropy,
    /// Gradient norm against the model's own pseudo-labels.
    GradientNorm,
    /// Input or latent drift relative to the learned baseline.
    Drift,
}

impl SignalKey {
    /// Every tracked key.
    pub const ALL: [SignalKey; 3] = [SignalKey::Entropy, SignalKey::GradientNorm, SignalKey::Drift];

    /// Wire name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKey::Entropy => "entropy",
            SignalKey::GradientNorm => "gradient_norm",
            SignalKey::Drift => "drift",
        }
    }

    /// Baseline used before the key's window has warmed up.
    pub fn cold_start_baseline(&self) -> Baseline {
        match self {
            SignalKey::Entropy => Baseline::new(0.5, 0.1),
            SignalKey::GradientNorm => Baseline::new(1.0, 0.2),
            SignalKey::Drift => Baseline::new(0.0, 0.05),
        }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKey {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entropy" => Ok(SignalKey::Entropy),
            "gradient_norm" => Ok(SignalKey::GradientNorm),
            "drift" => Ok(SignalKey::Drift),
            other => Err(PolicyError::UnknownSignal(other.to_string())),
        }
    }
}

// ── Signal vectors ──────────────────────────────────────────────────────

/// Named signal readings in insertion order.
///
/// Inserting an existing name overwrites its value in place, so a name
/// appears at most once and keeps the position of its first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalVector {
    entries: Vec<(String, f64)>,
}

impl SignalVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style insert for a tracked key.
    pub fn with_key(self, key: SignalKey, value: f64) -> Self {
        self.with(key.as_str(), value)
    }

    /// Insert or overwrite a reading.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value for an arbitrary signal name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Value for a tracked key.
    pub fn value(&self, key: SignalKey) -> Option<f64> {
        self.get(key.as_str())
    }

    /// Value for a tracked key, reading a missing key as zero.
    pub fn value_or_zero(&self, key: SignalKey) -> f64 {
        self.value(key).unwrap_or(0.0)
    }

    /// All readings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Readings whose name is a tracked key, in insertion order.
    pub fn tracked(&self) -> impl Iterator<Item = (SignalKey, f64)> + '_ {
        self.entries
            .iter()
            .filter_map(|(n, v)| n.parse::<SignalKey>().ok().map(|k| (k, *v)))
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector holds no readings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for SignalVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut vector = SignalVector::new();
        for (name, value) in iter {
            vector.insert(name, value);
        }
        vector
    }
}

impl Serialize for SignalVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SignalVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignalVectorVisitor;

        impl<'de> Visitor<'de> for SignalVectorVisitor {
            type Value = SignalVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of signal names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut vector = SignalVector::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    vector.insert(name, value);
                }
                Ok(vector)
            }
        }

        deserializer.deserialize_map(SignalVectorVisitor)
    }
}
