//! Bounded FIFO windows and the baselines derived from them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::STD_FLOOR;

/// Mean and standard deviation describing "normal" for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
}

impl Baseline {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Upper bound `mean + sigma * std`.
    pub fn upper_bound(&self, sigma: f64) -> f64 {
        self.mean + sigma * self.std
    }
}

/// Fixed-capacity window of the most recent values for one signal.
///
/// Pushing into a full window evicts the oldest value, so `len()` never
/// exceeds `capacity()`.
#[derive(Debug, Clone)]
pub struct SignalWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SignalWindow {
    /// Create an empty window. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, returning the evicted oldest value if the window was full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() >= self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Arithmetic mean of the window, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Population (not Bessel-corrected) standard deviation, `None` when empty.
    pub fn population_std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let n = self.values.len() as f64;
        let variance = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(variance.sqrt())
    }

    /// Baseline of the current contents with the std floor added.
    pub fn baseline(&self) -> Option<Baseline> {
        let mean = self.mean()?;
        let std = self.population_std()?;
        Some(Baseline::new(mean, std + STD_FLOOR))
    }
}
