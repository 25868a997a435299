// src/reasoning.rs
//
// Human-readable explanations derived from the same thresholds the
// scorer already crossed. Check order is fixed so identical inputs
// always produce identical output, which snapshot-style tests rely on.

use crate::types::{BusinessImpact, ExecutionFrequency, TestCase, TestType};

pub fn generate(test: &TestCase, score: f64, changes: Option<&[String]>) -> Vec<String> {
    let mut reasoning = Vec::new();

    if test.failure_count > 5 {
        reasoning.push(format!(
            "High failure rate: {} recent failures",
            test.failure_count
        ));
    }

    if matches!(
        test.business_impact,
        BusinessImpact::Critical | BusinessImpact::High
    ) {
        reasoning.push(format!(
            "High business impact: {:?}",
            test.business_impact
        ));
    }

    if test.code_coverage > 80.0 {
        reasoning.push(format!("High code coverage: {}%", test.code_coverage));
    }

    if let Some(changes) = changes {
        if changes.iter().any(|c| c == &test.file_path) {
            reasoning.push("Test file recently modified".to_string());
        }
    }

    if matches!(test.test_type, TestType::Security | TestType::Api) {
        reasoning.push(format!("Critical test type: {}", test.test_type.as_str()));
    }

    if test.execution_time < 30.0 {
        reasoning.push("Fast execution time".to_string());
    }

    if score >= 0.8 {
        reasoning.push("URGENT: Run immediately".to_string());
    } else if score >= 0.6 {
        reasoning.push("HIGH PRIORITY: Run in next cycle".to_string());
    }

    reasoning
}

/// Score bands map to run cadence; unit tests get a floor of every
/// build even when their score is low.
pub fn recommend_frequency(score: f64, test_type: TestType) -> ExecutionFrequency {
    if score >= 0.8 {
        ExecutionFrequency::EveryCommit
    } else if score >= 0.6 {
        ExecutionFrequency::EveryBuild
    } else if score >= 0.4 {
        ExecutionFrequency::Daily
    } else if test_type == TestType::Unit {
        ExecutionFrequency::EveryBuild
    } else {
        ExecutionFrequency::Weekly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> TestCase {
        TestCase {
            name: "test_login".to_string(),
            file_path: "tests/test_login.py".to_string(),
            test_type: TestType::Security,
            execution_time: 12.0,
            failure_count: 7,
            last_failure: None,
            code_coverage: 91.0,
            business_impact: BusinessImpact::Critical,
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn reasoning_order_is_stable() {
        let t = case();
        let changes = vec!["tests/test_login.py".to_string()];

        let lines = generate(&t, 0.85, Some(&changes));
        assert_eq!(
            lines,
            vec![
                "High failure rate: 7 recent failures",
                "High business impact: Critical",
                "High code coverage: 91%",
                "Test file recently modified",
                "Critical test type: SECURITY",
                "Fast execution time",
                "URGENT: Run immediately",
            ]
        );

        // Identical inputs, identical output.
        assert_eq!(lines, generate(&t, 0.85, Some(&changes)));
    }

    #[test]
    fn mid_band_score_gets_next_cycle_line() {
        let mut t = case();
        t.failure_count = 0;
        t.business_impact = BusinessImpact::Low;
        t.code_coverage = 40.0;
        t.test_type = TestType::Database;
        t.execution_time = 200.0;

        let lines = generate(&t, 0.65, None);
        assert_eq!(lines, vec!["HIGH PRIORITY: Run in next cycle"]);
    }

    #[test]
    fn quiet_test_can_produce_no_reasoning() {
        let mut t = case();
        t.failure_count = 0;
        t.business_impact = BusinessImpact::Medium;
        t.code_coverage = 50.0;
        t.test_type = TestType::Integration;
        t.execution_time = 120.0;

        assert!(generate(&t, 0.3, None).is_empty());
    }

    #[test]
    fn frequency_bands_match_thresholds() {
        assert_eq!(
            recommend_frequency(0.9, TestType::Api),
            ExecutionFrequency::EveryCommit
        );
        assert_eq!(
            recommend_frequency(0.7, TestType::Api),
            ExecutionFrequency::EveryBuild
        );
        assert_eq!(
            recommend_frequency(0.5, TestType::Api),
            ExecutionFrequency::Daily
        );
        assert_eq!(
            recommend_frequency(0.2, TestType::Api),
            ExecutionFrequency::Weekly
        );
    }

    #[test]
    fn low_scoring_unit_tests_still_run_every_build() {
        assert_eq!(
            recommend_frequency(0.1, TestType::Unit),
            ExecutionFrequency::EveryBuild
        );
    }
}
