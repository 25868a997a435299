// Risk-based test prioritization and CI execution planning.
//
// The pipeline: signal extraction -> heuristic score -> optional model
// blend -> risk classification + reasoning -> ranked list -> optional
// budget selection -> execution plan.

pub mod budget;
pub mod cli;
pub mod config;
pub mod engine;
pub mod history;
pub mod model;
pub mod plan;
pub mod reasoning;
pub mod signals;
pub mod types;

pub use config::EngineConfig;
pub use engine::Prioritizer;
pub use model::Predictor;
pub use plan::{build_plan, ExecutionPlan};
pub use types::{
    BusinessImpact, ExecutionFrequency, PriorityScore, RiskLevel, TestCase, TestType,
};
