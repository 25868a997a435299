// src/plan.rs
//
// Plan synthesis: groups a scored batch into risk-ordered phases,
// derives phase and plan statistics, and emits advisory insights for
// the reporting layer. Everything here is read-only aggregation over
// the PriorityScore list.

use chrono::Utc;
use serde::Serialize;

use crate::types::{PriorityScore, RiskLevel, TestType};

/// Runtime split point inside the critical phase: tests under this run
/// as one parallel batch, the rest run sequentially.
const FAST_TEST_SECS: f64 = 60.0;

/// Upper bound on assumed parallel workers for the fast batch.
const MAX_PARALLEL_WORKERS: usize = 4;

/// Runtime above which a test counts as slow in insights.
const SLOW_TEST_SECS: f64 = 300.0;

/* ---------- plan model ---------- */

#[derive(Debug, Serialize)]
pub struct ExecutionPlan {
    pub generated_at: String,
    pub summary: PlanSummary,
    /// Ordered CRITICAL -> HIGH -> MEDIUM -> LOW; empty levels are
    /// omitted here but still counted as zero in the summary.
    pub phases: Vec<ExecutionPhase>,
    pub insights: PlanInsights,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub total_tests: usize,
    pub critical_tests: usize,
    pub high_priority_tests: usize,
    pub medium_priority_tests: usize,
    pub low_priority_tests: usize,
    /// How many tests got a blended model score this run.
    pub model_scored_tests: usize,
    /// Wall-clock sum of every selected test.
    pub total_time_secs: f64,
    /// Sum of per-phase estimates after parallelization.
    pub estimated_time_secs: f64,
    pub optimization_score: f64,
}

#[derive(Debug, Serialize)]
pub struct ExecutionPhase {
    pub risk_level: RiskLevel,
    pub description: String,
    pub tests: Vec<String>,
    /// Fast tests that can run as one parallel batch. Only the
    /// critical phase is split; elsewhere this stays empty.
    pub parallel_batch: Vec<String>,
    pub sequential_batch: Vec<String>,
    pub parallelization_factor: usize,
    pub total_time_secs: f64,
    pub estimated_time_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct PlanInsights {
    pub score_mean: f64,
    pub score_stddev: f64,
    /// Fraction of tests scoring above 0.6.
    pub high_priority_ratio: f64,
    /// Fraction of tests scoring below 0.4.
    pub low_priority_ratio: f64,
    pub risk_areas: Vec<String>,
    pub optimization_opportunities: Vec<String>,
    pub suggested_improvements: Vec<String>,
}

/* ---------- synthesis ---------- */

pub fn build_plan(scores: &[PriorityScore]) -> ExecutionPlan {
    let mut phases = Vec::new();
    let mut counts = [0usize; 4];

    for (idx, level) in RiskLevel::ORDERED.iter().enumerate() {
        let members: Vec<&PriorityScore> = scores
            .iter()
            .filter(|s| s.risk_level == *level)
            .collect();
        counts[idx] = members.len();
        if members.is_empty() {
            continue;
        }
        phases.push(build_phase(*level, &members));
    }

    let total_time: f64 = scores.iter().map(|s| s.test_case.execution_time.max(0.0)).sum();
    let estimated_time: f64 = phases.iter().map(|p| p.estimated_time_secs).sum();

    ExecutionPlan {
        generated_at: Utc::now().to_rfc3339(),
        summary: PlanSummary {
            total_tests: scores.len(),
            critical_tests: counts[0],
            high_priority_tests: counts[1],
            medium_priority_tests: counts[2],
            low_priority_tests: counts[3],
            model_scored_tests: scores.iter().filter(|s| s.model_used).count(),
            total_time_secs: total_time,
            estimated_time_secs: estimated_time,
            optimization_score: optimization_score(scores, total_time),
        },
        insights: build_insights(scores),
        recommendations: build_recommendations(scores, counts[0]),
        phases,
    }
}

fn build_phase(level: RiskLevel, members: &[&PriorityScore]) -> ExecutionPhase {
    let tests: Vec<String> = members.iter().map(|s| s.test_case.name.clone()).collect();
    let total_time: f64 = members
        .iter()
        .map(|s| s.test_case.execution_time.max(0.0))
        .sum();

    // Only the critical phase is worth a parallel/sequential split; the
    // later phases run whenever capacity allows.
    if level != RiskLevel::Critical {
        return ExecutionPhase {
            risk_level: level,
            description: phase_description(level).to_string(),
            sequential_batch: tests.clone(),
            tests,
            parallel_batch: Vec::new(),
            parallelization_factor: 1,
            total_time_secs: total_time,
            estimated_time_secs: total_time,
        };
    }

    let mut parallel_batch = Vec::new();
    let mut sequential_batch = Vec::new();
    let mut parallel_time = 0.0;
    let mut sequential_time = 0.0;

    for score in members {
        let time = score.test_case.execution_time.max(0.0);
        if time < FAST_TEST_SECS {
            parallel_batch.push(score.test_case.name.clone());
            parallel_time += time;
        } else {
            sequential_batch.push(score.test_case.name.clone());
            sequential_time += time;
        }
    }

    let factor = parallel_batch.len().min(MAX_PARALLEL_WORKERS).max(1);
    let estimated = (parallel_time / factor as f64).max(sequential_time);

    ExecutionPhase {
        risk_level: level,
        description: phase_description(level).to_string(),
        tests,
        parallel_batch,
        sequential_batch,
        parallelization_factor: factor,
        total_time_secs: total_time,
        estimated_time_secs: estimated,
    }
}

fn phase_description(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "Must run - critical for release",
        RiskLevel::High => "Should run - high impact",
        RiskLevel::Medium => "Can run - medium priority",
        RiskLevel::Low => "Optional - low priority",
    }
}

/* ---------- statistics ---------- */

fn optimization_score(scores: &[PriorityScore], total_time: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let n = scores.len() as f64;
    let time_factor = (1.0 - total_time / 3600.0).max(0.0);
    let avg_priority = scores.iter().map(|s| s.score).sum::<f64>() / n;
    // Each ratio is already <= 1: score <= 1 and the denominator is
    // floored at one second.
    let efficiency = scores
        .iter()
        .map(|s| s.score / s.test_case.execution_time.max(1.0))
        .sum::<f64>()
        / n;

    0.3 * time_factor + 0.4 * avg_priority + 0.3 * efficiency
}

fn build_insights(scores: &[PriorityScore]) -> PlanInsights {
    if scores.is_empty() {
        return PlanInsights {
            score_mean: 0.0,
            score_stddev: 0.0,
            high_priority_ratio: 0.0,
            low_priority_ratio: 0.0,
            risk_areas: Vec::new(),
            optimization_opportunities: Vec::new(),
            suggested_improvements: Vec::new(),
        };
    }

    let n = scores.len() as f64;
    let mean = scores.iter().map(|s| s.score).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|s| (s.score - mean).powi(2))
        .sum::<f64>()
        / n;

    PlanInsights {
        score_mean: mean,
        score_stddev: variance.sqrt(),
        high_priority_ratio: scores.iter().filter(|s| s.score > 0.6).count() as f64 / n,
        low_priority_ratio: scores.iter().filter(|s| s.score < 0.4).count() as f64 / n,
        risk_areas: identify_risk_areas(scores),
        optimization_opportunities: find_opportunities(scores),
        suggested_improvements: suggest_improvements(scores),
    }
}

/// Flags categories where more than half the tests score high: a sign
/// the area itself is risky, not just individual tests.
fn identify_risk_areas(scores: &[PriorityScore]) -> Vec<String> {
    let mut areas = Vec::new();

    for test_type in [
        TestType::Security,
        TestType::Api,
        TestType::Database,
        TestType::Integration,
        TestType::Ui,
        TestType::Unit,
        TestType::Other,
    ] {
        let members: Vec<&PriorityScore> = scores
            .iter()
            .filter(|s| s.test_case.test_type == test_type)
            .collect();
        if members.is_empty() {
            continue;
        }
        let high = members.iter().filter(|s| s.score > 0.6).count();
        if high * 2 > members.len() {
            areas.push(format!(
                "{} tests show high risk patterns",
                test_type.as_str()
            ));
        }
    }

    areas
}

fn find_opportunities(scores: &[PriorityScore]) -> Vec<String> {
    let mut opportunities = Vec::new();

    let deprioritize: Vec<&str> = scores
        .iter()
        .filter(|s| s.test_case.execution_time > SLOW_TEST_SECS && s.score < 0.4)
        .map(|s| s.test_case.name.as_str())
        .collect();
    if !deprioritize.is_empty() {
        opportunities.push(format!(
            "{} slow low-priority tests could move to a nightly run: {}",
            deprioritize.len(),
            deprioritize.join(", ")
        ));
    }

    let unstable = scores
        .iter()
        .filter(|s| s.test_case.failure_count > 5)
        .count();
    if unstable > 0 {
        opportunities.push(format!(
            "{unstable} tests fail repeatedly; stabilizing them would shrink every run"
        ));
    }

    opportunities
}

fn suggest_improvements(scores: &[PriorityScore]) -> Vec<String> {
    let mut suggestions = Vec::new();

    let coverage_gaps = scores
        .iter()
        .filter(|s| s.score > 0.6 && s.test_case.code_coverage < 50.0)
        .count();
    if coverage_gaps > 0 {
        suggestions.push("Improve code coverage for high-priority test areas".to_string());
    }

    let flaky = scores
        .iter()
        .filter(|s| s.test_case.failure_count > 3)
        .count();
    if flaky > 0 {
        suggestions.push(format!("Investigate and fix {flaky} flaky tests"));
    }

    suggestions
}

fn build_recommendations(scores: &[PriorityScore], critical_count: usize) -> Vec<String> {
    let mut recommendations = Vec::new();

    if critical_count > 10 {
        recommendations.push(format!(
            "High number of critical tests ({critical_count}) - consider code quality review"
        ));
    }

    let slow = scores
        .iter()
        .filter(|s| s.test_case.execution_time > SLOW_TEST_SECS)
        .count();
    if slow > 0 {
        recommendations.push(format!(
            "Optimize {slow} slow tests for better CI performance"
        ));
    }

    let security = scores
        .iter()
        .filter(|s| s.test_case.test_type == TestType::Security)
        .count();
    if security > 0 {
        recommendations.push(format!(
            "Prioritize {security} security tests in every build"
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BusinessImpact, ExecutionFrequency, TestCase};

    fn scored(name: &str, score: f64, time: f64, level: RiskLevel) -> PriorityScore {
        PriorityScore {
            test_case: TestCase {
                name: name.to_string(),
                file_path: format!("{name}.py"),
                test_type: TestType::Api,
                execution_time: time,
                failure_count: 0,
                last_failure: None,
                code_coverage: 70.0,
                business_impact: BusinessImpact::Medium,
                dependencies: Vec::new(),
            },
            score,
            risk_level: level,
            reasoning: Vec::new(),
            recommended_frequency: ExecutionFrequency::Daily,
            model_used: false,
            model_error: None,
        }
    }

    #[test]
    fn phases_come_out_in_risk_order_and_skip_empty_levels() {
        let scores = vec![
            scored("low_1", 0.2, 10.0, RiskLevel::Low),
            scored("crit_1", 0.9, 10.0, RiskLevel::Critical),
            scored("med_1", 0.5, 10.0, RiskLevel::Medium),
        ];

        let plan = build_plan(&scores);
        let levels: Vec<RiskLevel> = plan.phases.iter().map(|p| p.risk_level).collect();
        assert_eq!(
            levels,
            vec![RiskLevel::Critical, RiskLevel::Medium, RiskLevel::Low]
        );
        assert_eq!(plan.summary.high_priority_tests, 0);
        assert_eq!(plan.summary.critical_tests, 1);
        assert_eq!(plan.summary.total_tests, 3);
    }

    #[test]
    fn critical_phase_splits_fast_and_slow_batches() {
        let scores = vec![
            scored("fast_a", 0.9, 10.0, RiskLevel::Critical),
            scored("fast_b", 0.9, 20.0, RiskLevel::Critical),
            scored("fast_c", 0.9, 30.0, RiskLevel::Critical),
            scored("slow_a", 0.9, 120.0, RiskLevel::Critical),
        ];

        let plan = build_plan(&scores);
        let critical = &plan.phases[0];
        assert_eq!(critical.parallel_batch.len(), 3);
        assert_eq!(critical.sequential_batch, vec!["slow_a"]);
        assert_eq!(critical.parallelization_factor, 3);
        // max(60 / 3, 120) = 120
        assert!((critical.estimated_time_secs - 120.0).abs() < 1e-12);
        assert!((critical.total_time_secs - 180.0).abs() < 1e-12);
    }

    #[test]
    fn parallelization_factor_is_capped_at_four() {
        let scores: Vec<PriorityScore> = (0..6)
            .map(|i| scored(&format!("fast_{i}"), 0.9, 40.0, RiskLevel::Critical))
            .collect();

        let plan = build_plan(&scores);
        let critical = &plan.phases[0];
        assert_eq!(critical.parallelization_factor, 4);
        // max(240 / 4, 0) = 60
        assert!((critical.estimated_time_secs - 60.0).abs() < 1e-12);
    }

    #[test]
    fn non_critical_phases_run_sequentially() {
        let scores = vec![
            scored("high_a", 0.7, 30.0, RiskLevel::High),
            scored("high_b", 0.7, 50.0, RiskLevel::High),
        ];

        let plan = build_plan(&scores);
        let phase = &plan.phases[0];
        assert_eq!(phase.parallelization_factor, 1);
        assert!(phase.parallel_batch.is_empty());
        assert_eq!(phase.sequential_batch.len(), 2);
        assert!((phase.estimated_time_secs - 80.0).abs() < 1e-12);
    }

    #[test]
    fn optimization_score_stays_in_unit_range() {
        let scores = vec![
            scored("a", 1.0, 1.0, RiskLevel::Critical),
            scored("b", 0.0, 7200.0, RiskLevel::Low),
        ];
        let plan = build_plan(&scores);
        assert!((0.0..=1.0).contains(&plan.summary.optimization_score));

        // All-fast, all-high batch approaches the ceiling.
        let good = vec![scored("x", 1.0, 0.5, RiskLevel::Critical)];
        let plan = build_plan(&good);
        assert!(plan.summary.optimization_score > 0.95);
    }

    #[test]
    fn empty_batch_produces_an_empty_plan_not_nans() {
        let plan = build_plan(&[]);
        assert_eq!(plan.summary.total_tests, 0);
        assert_eq!(plan.summary.optimization_score, 0.0);
        assert!(plan.phases.is_empty());
        assert_eq!(plan.insights.score_mean, 0.0);
        assert_eq!(plan.insights.score_stddev, 0.0);
    }

    #[test]
    fn distribution_stats_match_hand_computation() {
        let scores = vec![
            scored("a", 0.8, 10.0, RiskLevel::Critical),
            scored("b", 0.4, 10.0, RiskLevel::Medium),
            scored("c", 0.2, 10.0, RiskLevel::Low),
        ];

        let plan = build_plan(&scores);
        let mean = (0.8 + 0.4 + 0.2) / 3.0;
        assert!((plan.insights.score_mean - mean).abs() < 1e-12);
        assert!((plan.insights.high_priority_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert!((plan.insights.low_priority_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn risk_areas_flag_categories_with_mostly_high_scores() {
        let mut a = scored("api_a", 0.9, 10.0, RiskLevel::Critical);
        let mut b = scored("api_b", 0.7, 10.0, RiskLevel::High);
        let mut c = scored("api_c", 0.1, 10.0, RiskLevel::Low);
        a.test_case.test_type = TestType::Api;
        b.test_case.test_type = TestType::Api;
        c.test_case.test_type = TestType::Api;
        let mut d = scored("unit_a", 0.1, 10.0, RiskLevel::Low);
        d.test_case.test_type = TestType::Unit;

        let plan = build_plan(&[a, b, c, d]);
        assert_eq!(
            plan.insights.risk_areas,
            vec!["API tests show high risk patterns"]
        );
    }

    #[test]
    fn opportunities_and_improvements_fire_on_thresholds() {
        let mut sluggish = scored("sluggish", 0.2, 400.0, RiskLevel::Low);
        sluggish.test_case.failure_count = 0;
        let mut flaky = scored("flaky", 0.7, 10.0, RiskLevel::High);
        flaky.test_case.failure_count = 6;
        flaky.test_case.code_coverage = 30.0;

        let plan = build_plan(&[sluggish, flaky]);

        assert_eq!(plan.insights.optimization_opportunities.len(), 2);
        assert!(plan.insights.optimization_opportunities[0].contains("sluggish"));
        assert!(plan.insights.optimization_opportunities[1].contains("1 tests fail repeatedly"));
        assert_eq!(
            plan.insights.suggested_improvements,
            vec![
                "Improve code coverage for high-priority test areas",
                "Investigate and fix 1 flaky tests",
            ]
        );
    }

    #[test]
    fn recommendations_cover_critical_volume_slow_and_security() {
        let mut scores: Vec<PriorityScore> = (0..11)
            .map(|i| scored(&format!("crit_{i}"), 0.9, 10.0, RiskLevel::Critical))
            .collect();
        scores.push(scored("slowpoke", 0.5, 400.0, RiskLevel::Medium));
        let mut sec = scored("sec_scan", 0.9, 20.0, RiskLevel::Critical);
        sec.test_case.test_type = TestType::Security;
        scores.push(sec);

        let plan = build_plan(&scores);
        assert_eq!(plan.recommendations.len(), 3);
        assert!(plan.recommendations[0].contains("critical tests (12)"));
        assert!(plan.recommendations[1].contains("1 slow tests"));
        assert!(plan.recommendations[2].contains("1 security tests"));
    }

    #[test]
    fn plan_serializes_to_json() {
        let plan = build_plan(&[scored("a", 0.9, 10.0, RiskLevel::Critical)]);
        let json = serde_json::to_string_pretty(&plan).unwrap();
        assert!(json.contains("\"risk_level\": \"CRITICAL\""));
        assert!(json.contains("\"optimization_score\""));
    }
}
