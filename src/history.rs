// src/history.rs
//
// Bounded per-test sliding window of previously observed priority
// scores. Callers record an observation after a test actually runs;
// the extractor side only ever reads averages.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Process-lifetime store, owned by the engine instance. The single
/// map-wide lock serializes concurrent appends to the same window; no
/// cross-key coordination is needed and none is attempted.
#[derive(Debug)]
pub struct PerformanceHistory {
    window: usize,
    scores: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl PerformanceHistory {
    pub fn new(window: usize) -> Self {
        PerformanceHistory {
            window,
            scores: Mutex::new(HashMap::new()),
        }
    }

    /// Append an observed priority for `name`, evicting the oldest entry
    /// once the window is full.
    pub fn record(&self, name: &str, score: f64) {
        let mut scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        let entries = scores.entry(name.to_string()).or_default();
        if entries.len() >= self.window {
            entries.pop_front();
        }
        entries.push_back(score);
    }

    /// Mean of the recorded window, or None for an unseen test.
    pub fn average(&self, name: &str) -> Option<f64> {
        let scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        let entries = scores.get(name)?;
        if entries.is_empty() {
            return None;
        }
        Some(entries.iter().sum::<f64>() / entries.len() as f64)
    }

    pub fn observation_count(&self, name: &str) -> usize {
        let scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        scores.get(name).map(|e| e.len()).unwrap_or(0)
    }
}
