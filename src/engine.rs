// src/engine.rs
//
// The prioritizer: heuristic scorer, ensemble blend, risk classifier,
// and the batch entry points. One instance owns the configuration and
// the performance history; scoring itself is per-test independent, so a
// shared instance can be driven from several threads.

use chrono::{DateTime, Utc};

use crate::budget::select_within_budget;
use crate::config::EngineConfig;
use crate::history::PerformanceHistory;
use crate::model::{feature_vector, guarded_predict, Predictor};
use crate::reasoning;
use crate::signals;
use crate::types::{PriorityScore, TestCase};

pub struct Prioritizer {
    config: EngineConfig,
    history: PerformanceHistory,
    model: Option<Box<dyn Predictor>>,
}

impl Prioritizer {
    /// Fails fast on invalid configuration; a silently wrong weight
    /// table would skew every score afterwards.
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        config.validate()?;
        let history = PerformanceHistory::new(config.history_window);
        Ok(Prioritizer {
            config,
            history,
            model: None,
        })
    }

    pub fn with_model(mut self, model: Box<dyn Predictor>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &PerformanceHistory {
        &self.history
    }

    /// Record the observed priority after a test actually ran, feeding
    /// the historical-average model feature for later runs.
    pub fn record_observation(&self, name: &str, score: f64) {
        self.history.record(name, score);
    }

    /* ---------- scoring ---------- */

    /// Score a whole batch: highest priority first, names break ties.
    /// With a budget, the greedy optimizer filters the batch and the
    /// survivors come back in priority order.
    pub fn prioritize(
        &self,
        tests: &[TestCase],
        changes: Option<&[String]>,
        budget_secs: Option<f64>,
    ) -> Vec<PriorityScore> {
        self.prioritize_at(tests, changes, budget_secs, Utc::now())
    }

    /// Same as `prioritize` with an explicit clock, for deterministic
    /// replay and tests.
    pub fn prioritize_at(
        &self,
        tests: &[TestCase],
        changes: Option<&[String]>,
        budget_secs: Option<f64>,
        now: DateTime<Utc>,
    ) -> Vec<PriorityScore> {
        let mut scored: Vec<PriorityScore> = tests
            .iter()
            .map(|test| self.score_test_at(test, changes, now))
            .collect();

        scored.sort_by(|a, b| a.rank_cmp(b));

        if let Some(budget) = budget_secs {
            scored = select_within_budget(&scored, budget);
            scored.sort_by(|a, b| a.rank_cmp(b));
        }

        scored
    }

    pub fn score_test(&self, test: &TestCase, changes: Option<&[String]>) -> PriorityScore {
        self.score_test_at(test, changes, Utc::now())
    }

    pub fn score_test_at(
        &self,
        test: &TestCase,
        changes: Option<&[String]>,
        now: DateTime<Utc>,
    ) -> PriorityScore {
        let signals = signals::extract(test, changes, now);
        let heuristic = self.heuristic_score(&signals);

        let mut model_used = false;
        let mut model_error = None;
        let final_score = match self.model.as_deref() {
            Some(predictor) => {
                let features =
                    feature_vector(test, &signals, self.history.average(&test.name));
                match guarded_predict(predictor, &features) {
                    Ok(model_score) => {
                        model_used = true;
                        self.config.blend.heuristic * heuristic
                            + self.config.blend.model * model_score
                    }
                    Err(e) => {
                        // Heuristic-only fallback, surfaced on the
                        // result rather than raised.
                        model_error = Some(e);
                        heuristic
                    }
                }
            }
            None => heuristic,
        };
        let final_score = final_score.clamp(0.0, 1.0);

        PriorityScore {
            risk_level: self.config.classify(final_score),
            reasoning: reasoning::generate(test, final_score, changes),
            recommended_frequency: reasoning::recommend_frequency(final_score, test.test_type),
            score: final_score,
            model_used,
            model_error,
            test_case: test.clone(),
        }
    }

    fn heuristic_score(&self, signals: &signals::SignalSet) -> f64 {
        let weights = &self.config.weights;
        let weighted = signals.failure * weights.failure_history
            + signals.business * weights.business_impact
            + signals.coverage * weights.code_coverage
            + signals.time * weights.execution_time
            + signals.change * weights.code_changes;

        (weighted * signals.category).clamp(0.0, 1.0)
    }
}
