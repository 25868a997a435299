// src/budget.rs
//
// Greedy score-per-time selection under a wall-clock budget. This is a
// deliberate approximation of the knapsack optimum: plans are advisory,
// so best-ratio-first is good enough and predictable.

use std::cmp::Ordering;

use crate::types::PriorityScore;

/// Selects a subset whose total execution time stays within
/// `budget_secs`. An entry that does not fit is skipped, not terminal,
/// so cheaper tests later in ratio order still get a chance. A budget
/// below the cheapest test yields an empty selection.
pub fn select_within_budget(scores: &[PriorityScore], budget_secs: f64) -> Vec<PriorityScore> {
    let mut remaining: Vec<&PriorityScore> = scores.iter().collect();
    remaining.sort_by(|a, b| {
        ratio(b)
            .partial_cmp(&ratio(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.test_case.name.cmp(&b.test_case.name))
    });

    let mut selected = Vec::new();
    let mut total_time = 0.0;

    for score in remaining {
        let cost = score.test_case.execution_time.max(0.0);
        if total_time + cost <= budget_secs {
            selected.push(score.clone());
            total_time += cost;
        }
    }

    selected
}

fn ratio(score: &PriorityScore) -> f64 {
    score.score / score.test_case.execution_time.max(1.0)
}
