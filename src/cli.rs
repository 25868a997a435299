// src/cli.rs
//
// The `plan` command: read a test-case batch, score it, synthesize the
// execution plan, print a short summary plus the full JSON report.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::engine::Prioritizer;
use crate::plan::{self, ExecutionPlan};
use crate::types::{PriorityScore, TestCase};

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, help = "JSON file with the test-case batch (array of objects)")]
    pub input: PathBuf,

    #[arg(long, help = "Comma-separated list of recently changed files")]
    pub changes: Option<String>,

    #[arg(long, help = "File with one changed path per line")]
    pub changes_file: Option<PathBuf>,

    #[arg(long, help = "Time budget in seconds; selects a greedy subset")]
    pub budget: Option<f64>,

    #[arg(long, help = "Write the full report JSON to this file")]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Only print JSON report")]
    pub json_only: bool,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    input: String,
    scanned_tests: usize,
    changed_files: usize,
    budget_secs: Option<f64>,
    ranked_tests: Vec<PriorityScore>,
    plan: ExecutionPlan,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&args.input)
        .map_err(|e| format!("cannot read {}: {e}", args.input.display()))?;
    let tests: Vec<TestCase> = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid test batch in {}: {e}", args.input.display()))?;

    let changes = collect_changes(&args)?;
    let changeset = if changes.is_empty() {
        None
    } else {
        Some(changes.as_slice())
    };

    let engine = Prioritizer::new(EngineConfig::default())?;
    let ranked = engine.prioritize(&tests, changeset, args.budget);
    let plan = plan::build_plan(&ranked);

    let report = PlanReport {
        input: args.input.display().to_string(),
        scanned_tests: tests.len(),
        changed_files: changes.len(),
        budget_secs: args.budget,
        ranked_tests: ranked,
        plan,
    };

    let json_report = serde_json::to_string_pretty(&report)?;

    if let Some(path) = args.out.as_ref() {
        fs::write(path, &json_report)?;
    }

    if args.json_only {
        println!("{}", json_report);
        return Ok(());
    }

    print_summary(&report, args.out.as_ref());
    println!("\n{}", json_report);

    Ok(())
}

fn collect_changes(args: &PlanArgs) -> Result<Vec<String>, Box<dyn Error>> {
    let mut changes = Vec::new();

    if let Some(list) = args.changes.as_ref() {
        for entry in list.split(',') {
            let entry = entry.trim();
            if !entry.is_empty() {
                changes.push(entry.to_string());
            }
        }
    }

    if let Some(path) = args.changes_file.as_ref() {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        for line in raw.lines() {
            let line = line.trim();
            if !line.is_empty() {
                changes.push(line.to_string());
            }
        }
    }

    Ok(changes)
}

fn print_summary(report: &PlanReport, out: Option<&PathBuf>) {
    println!("scanned: {} tests", report.scanned_tests);
    println!("changed files: {}", report.changed_files);
    if let Some(budget) = report.budget_secs {
        println!(
            "budget: {budget}s, selected {} tests",
            report.ranked_tests.len()
        );
    }

    if !report.ranked_tests.is_empty() {
        println!("top priorities:");
        for scored in report.ranked_tests.iter().take(5) {
            println!(
                "  [{:.3}] {} ({}, {:?})",
                scored.score,
                scored.test_case.name,
                scored.risk_level.as_str(),
                scored.recommended_frequency
            );
        }
    }

    let summary = &report.plan.summary;
    println!(
        "plan: {} phases, est. {:.1} min (raw {:.1} min), optimization {:.2}",
        report.plan.phases.len(),
        summary.estimated_time_secs / 60.0,
        summary.total_time_secs / 60.0,
        summary.optimization_score
    );

    for recommendation in &report.plan.recommendations {
        println!("  note: {recommendation}");
    }

    if let Some(path) = out {
        println!("report written to: {}", path.display());
    }
}
