// src/signals.rs
//
// Signal extractors: pure functions turning one test case (plus optional
// change context and history snapshot) into normalized sub-scores.
// Out-of-range inputs are clamped here so a malformed record degrades to
// a safe value instead of failing the batch.

use chrono::{DateTime, Utc};

use crate::config::{business_impact_score, category_weight};
use crate::types::TestCase;

/// Changed files matching any of these get an extra change-impact bump.
const CRITICAL_CHANGE_KEYWORDS: [&str; 4] = ["auth", "security", "payment", "database"];

/// Change-impact value when no changeset is supplied. A fixed low
/// baseline, not zero: absence of context is weaker evidence than
/// "nothing relevant changed".
pub const NO_CHANGESET_BASELINE: f64 = 0.1;

/// Failure signal for tests that have never failed.
pub const CLEAN_FAILURE_SIGNAL: f64 = 0.1;

/* ---------- signal set ---------- */

/// All sub-scores for one test, computed once and shared by the scorer,
/// the model feature vector, and the reasoning generator.
#[derive(Debug, Clone, Copy)]
pub struct SignalSet {
    pub failure: f64,
    pub business: f64,
    pub coverage: f64,
    pub time: f64,
    pub change: f64,
    /// Multiplier, not an additive signal.
    pub category: f64,
}

pub fn extract(test: &TestCase, changes: Option<&[String]>, now: DateTime<Utc>) -> SignalSet {
    SignalSet {
        failure: failure_signal(test, now),
        business: business_impact_score(test.business_impact),
        coverage: coverage_signal(test),
        time: time_signal(test),
        change: change_impact_signal(test, changes),
        category: category_weight(test.test_type),
    }
}

/* ---------- individual signals ---------- */

/// Blend of failure frequency and recency. Ten failures saturate the
/// frequency term; recency decays with a one-week half-scale.
pub fn failure_signal(test: &TestCase, now: DateTime<Utc>) -> f64 {
    if test.failure_count == 0 {
        return CLEAN_FAILURE_SIGNAL;
    }

    let frequency = (f64::from(test.failure_count) / 10.0).min(1.0);

    let recency = match test.last_failure.as_deref().and_then(parse_timestamp) {
        Some(at) => {
            let days = (now - at).num_days().max(0) as f64;
            1.0 / (1.0 + days / 7.0)
        }
        // Missing or unparsable timestamp: neutral recency.
        None => 0.5,
    };

    (frequency + recency) / 2.0
}

pub fn coverage_signal(test: &TestCase) -> f64 {
    test.code_coverage.clamp(0.0, 100.0) / 100.0
}

/// Inverse of runtime, normalized per minute. Fast tests are favored.
pub fn time_signal(test: &TestCase) -> f64 {
    1.0 / (1.0 + test.execution_time.max(0.0) / 60.0)
}

/// Accumulates direct, dependency, and keyword impact, clamped to 1.0.
pub fn change_impact_signal(test: &TestCase, changes: Option<&[String]>) -> f64 {
    let changes = match changes {
        Some(c) if !c.is_empty() => c,
        _ => return NO_CHANGESET_BASELINE,
    };

    let mut impact: f64 = 0.0;

    if changes.iter().any(|c| c == &test.file_path) {
        impact += 0.8;
    }

    for dependency in &test.dependencies {
        if changes.iter().any(|c| c.contains(dependency.as_str())) {
            impact += 0.3;
        }
    }

    for change in changes {
        let lowered = change.to_lowercase();
        if CRITICAL_CHANGE_KEYWORDS
            .iter()
            .any(|k| lowered.contains(*k))
        {
            impact += 0.2;
        }
    }

    impact.min(1.0)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
