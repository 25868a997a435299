// src/types.rs
//
// Shared data model for the prioritization engine.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/* ---------- categories ---------- */

/// Category tag of a test, in descending order of default weight.
///
/// `Other` absorbs unknown categories from the wire and scores with the
/// same default weight as `Unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestType {
    Security,
    Api,
    Database,
    Integration,
    Ui,
    Unit,
    #[serde(other)]
    Other,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Security => "SECURITY",
            TestType::Api => "API",
            TestType::Database => "DATABASE",
            TestType::Integration => "INTEGRATION",
            TestType::Ui => "UI",
            TestType::Unit => "UNIT",
            TestType::Other => "OTHER",
        }
    }
}

/* ---------- ordered tiers ---------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BusinessImpact {
    Low,
    Medium,
    High,
    Critical,
}

/// Risk bands assigned by the threshold classifier.
///
/// Variant order is the phase order of an execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Plan phases iterate risk levels highest first.
    pub const ORDERED: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionFrequency {
    #[serde(rename = "Every commit")]
    EveryCommit,
    #[serde(rename = "Every build")]
    EveryBuild,
    #[serde(rename = "Daily")]
    Daily,
    #[serde(rename = "Weekly")]
    Weekly,
}

/* ---------- test case ---------- */

/// Per-run metadata of a single test. Immutable during a scoring run.
///
/// Numeric fields out of range are clamped at scoring time rather than
/// rejected, so one malformed record never aborts a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub file_path: String,
    pub test_type: TestType,

    /// Expected wall-clock runtime in seconds.
    #[serde(default)]
    pub execution_time: f64,

    #[serde(default)]
    pub failure_count: u32,

    /// RFC3339 timestamp of the most recent failure, if any.
    #[serde(default)]
    pub last_failure: Option<String>,

    /// Percentage, 0-100.
    #[serde(default)]
    pub code_coverage: f64,

    #[serde(default = "default_impact")]
    pub business_impact: BusinessImpact,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_impact() -> BusinessImpact {
    BusinessImpact::Medium
}

/* ---------- scored output ---------- */

/// Scoring verdict for one test. Created fresh each run, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityScore {
    pub test_case: TestCase,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub reasoning: Vec<String>,
    pub recommended_frequency: ExecutionFrequency,

    /// False when no model is configured or the model was skipped for
    /// this test; the skip reason, if any, lands in `model_error`.
    pub model_used: bool,
    pub model_error: Option<String>,
}

impl PriorityScore {
    /// Batch ordering: score descending, name ascending on ties so a
    /// rescored batch always comes back in the same order.
    pub fn rank_cmp(&self, other: &PriorityScore) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.test_case.name.cmp(&other.test_case.name))
    }
}
