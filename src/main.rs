use std::error::Error;

use clap::{Parser, Subcommand};

use testrank::cli;

#[derive(Parser)]
#[command(
    name = "testrank",
    version,
    about = "Risk-based test prioritization and execution planning for CI pipelines."
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Score a test batch and produce a phased execution plan
    Plan(cli::PlanArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Plan(args) => cli::run(args),
    }
}
