// src/model.rs
//
// Boundary to an externally supplied predictive capability. The engine
// never depends on a concrete model library; anything that can map a
// feature vector to a [0, 1] score plugs in here. Model failures are
// demoted to "unavailable for this test", never propagated as fatal.

use crate::signals::SignalSet;
use crate::types::TestCase;

/// Bump whenever `feature_vector` changes its length or ordering.
/// The ordering is a hard contract with whatever trained the model;
/// any reorder silently invalidates previously trained models.
pub const FEATURE_VECTOR_VERSION: u32 = 1;

pub const FEATURE_COUNT: usize = 7;

/// Neutral stand-in for the historical-average feature when a test has
/// no recorded history yet.
const NEUTRAL_HISTORY: f64 = 0.5;

/// Injected inference capability: `features -> score in [0, 1]`.
///
/// Implementations wrapping remote or heavyweight models should enforce
/// their own timeout and surface it as an `Err`; the engine treats any
/// error as a per-test fallback to the heuristic score.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, String>;
}

/// Feature vector in the fixed v1 order:
///
/// 0. execution time (seconds, clamped non-negative)
/// 1. failure count
/// 2. code coverage (percentage, clamped 0-100)
/// 3. business impact score
/// 4. category weight
/// 5. change impact signal
/// 6. historical average priority (0.5 when unseen)
pub fn feature_vector(test: &TestCase, signals: &SignalSet, history_avg: Option<f64>) -> Vec<f64> {
    vec![
        test.execution_time.max(0.0),
        f64::from(test.failure_count),
        test.code_coverage.clamp(0.0, 100.0),
        signals.business,
        signals.category,
        signals.change,
        history_avg.unwrap_or(NEUTRAL_HISTORY),
    ]
}

/// Runs the predictor and enforces the output contract. Anything other
/// than a finite score in [0, 1] counts as a model failure.
pub fn guarded_predict(predictor: &dyn Predictor, features: &[f64]) -> Result<f64, String> {
    match predictor.predict(features) {
        Ok(score) if score.is_finite() && (0.0..=1.0).contains(&score) => Ok(score),
        Ok(score) => Err(format!("model returned out-of-range score {score}")),
        Err(e) => Err(format!("model inference failed: {e}")),
    }
}
