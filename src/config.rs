// src/config.rs
//
// Engine configuration and fail-fast validation. A misconfigured weight
// table would make every score subtly wrong, so construction rejects it
// instead of scoring with it.

use crate::types::{BusinessImpact, RiskLevel, TestType};

pub const HISTORY_WINDOW: usize = 50;

/// Tolerance when checking that weight sets sum to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/* ---------- weights ---------- */

/// Relative weight of each signal in the heuristic score.
#[derive(Debug, Clone, Copy)]
pub struct SignalWeights {
    pub failure_history: f64,
    pub business_impact: f64,
    pub code_coverage: f64,
    pub execution_time: f64,
    pub code_changes: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        SignalWeights {
            failure_history: 0.30,
            business_impact: 0.25,
            code_coverage: 0.20,
            execution_time: 0.10,
            code_changes: 0.15,
        }
    }
}

impl SignalWeights {
    pub fn sum(&self) -> f64 {
        self.failure_history
            + self.business_impact
            + self.code_coverage
            + self.execution_time
            + self.code_changes
    }
}

/// Heuristic/model mixing ratio for the ensemble blend.
#[derive(Debug, Clone, Copy)]
pub struct BlendWeights {
    pub heuristic: f64,
    pub model: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        BlendWeights {
            heuristic: 0.3,
            model: 0.7,
        }
    }
}

/* ---------- config ---------- */

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: SignalWeights,
    pub blend: BlendWeights,

    /// Evaluated top-down, first match wins. The final entry must be an
    /// unconditional 0.0 catch-all so no score falls through.
    pub risk_thresholds: Vec<(f64, RiskLevel)>,

    pub history_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            weights: SignalWeights::default(),
            blend: BlendWeights::default(),
            risk_thresholds: vec![
                (0.8, RiskLevel::Critical),
                (0.6, RiskLevel::High),
                (0.4, RiskLevel::Medium),
                (0.0, RiskLevel::Low),
            ],
            history_window: HISTORY_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(format!(
                "signal weights must sum to 1.0, got {sum:.6}"
            ));
        }

        let blend_sum = self.blend.heuristic + self.blend.model;
        if (blend_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(format!(
                "blend weights must sum to 1.0, got {blend_sum:.6}"
            ));
        }
        if self.blend.heuristic < 0.0 || self.blend.model < 0.0 {
            return Err("blend weights must be non-negative".to_string());
        }

        if self.risk_thresholds.is_empty() {
            return Err("risk threshold table is empty".to_string());
        }
        let mut prev = f64::INFINITY;
        for (threshold, level) in &self.risk_thresholds {
            if *threshold >= prev {
                return Err(format!(
                    "risk thresholds must be strictly descending, {threshold} after {prev}"
                ));
            }
            if !(0.0..=1.0).contains(threshold) {
                return Err(format!(
                    "risk threshold {threshold} for {} is outside [0, 1]",
                    level.as_str()
                ));
            }
            prev = *threshold;
        }
        let (last, _) = self.risk_thresholds[self.risk_thresholds.len() - 1];
        if last != 0.0 {
            return Err(format!(
                "last risk threshold must be a 0.0 catch-all, got {last}"
            ));
        }

        if self.history_window == 0 {
            return Err("history window must be at least 1".to_string());
        }

        Ok(())
    }

    /// First-match-wins classification. Validation guarantees the 0.0
    /// catch-all, so the fallback arm is unreachable for any finite
    /// score clamped to [0, 1].
    pub fn classify(&self, score: f64) -> RiskLevel {
        for (threshold, level) in &self.risk_thresholds {
            if score >= *threshold {
                return *level;
            }
        }
        RiskLevel::Low
    }
}

/* ---------- lookup tables ---------- */

/// Category multiplier applied on top of the weighted signal sum.
pub fn category_weight(test_type: TestType) -> f64 {
    match test_type {
        TestType::Security => 1.0,
        TestType::Api => 0.9,
        TestType::Database => 0.8,
        TestType::Integration => 0.7,
        TestType::Ui => 0.6,
        TestType::Unit => 0.5,
        TestType::Other => 0.5,
    }
}

pub fn business_impact_score(impact: BusinessImpact) -> f64 {
    match impact {
        BusinessImpact::Critical => 1.0,
        BusinessImpact::High => 0.8,
        BusinessImpact::Medium => 0.5,
        BusinessImpact::Low => 0.2,
    }
}
