mod commands;
mod logging;
mod progress;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::Cli;
use crossref_core::{AnalysisEngine, AnalysisOutcome, AnalysisRequest};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

const EXIT_CRITICAL: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    dotenv().ok();

    // Argument errors exit here, before logging or scanning starts
    let args = Cli::parse();

    let _guard = logging::init_logger();

    ExitCode::from(exit_code(run(args)))
}

fn exit_code(result: anyhow::Result<bool>) -> u8 {
    match result {
        Ok(has_critical) => verdict_code(has_critical),
        Err(err) => {
            error!("Error: {:#}", err);
            EXIT_FAILURE
        }
    }
}

/// 0 when nothing critical is missing, 1 otherwise. Run failures use
/// `EXIT_FAILURE` so they can never read as a clean report.
fn verdict_code(has_critical: bool) -> u8 {
    if has_critical {
        EXIT_CRITICAL
    } else {
        0
    }
}

fn run(args: Cli) -> anyhow::Result<bool> {
    let mut config = crossref_core::config::load_configuration(args.config.as_deref())
        .context("Error loading configuration")?;
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(false);
    }

    let request = AnalysisRequest {
        production_dir: args
            .production_dir
            .context("--production-dir is required")?,
        archive_dir: args.archive_dir.context("--archive-dir is required")?,
        output_dir: args.output_dir.context("--output-dir is required")?,
        deadline: args.deadline_secs.map(Duration::from_secs),
    };
    info!(
        "Analyzing {} against archive {}",
        request.production_dir.display(),
        request.archive_dir.display()
    );

    let engine = AnalysisEngine::new(config);
    let reporter = CliReporter::new();
    let outcome = engine
        .run(&request, &reporter)
        .context("Analysis did not complete")?;

    print_summary(&outcome);
    Ok(outcome.has_critical_findings())
}

fn print_summary(outcome: &AnalysisOutcome) {
    let summary = &outcome.report.summary;

    println!();
    info!(
        "Scan: {}, Analysis: {}",
        format!("{:.2}s", outcome.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", outcome.analysis_duration.as_secs_f64()).green(),
    );
    info!(
        "{} production files, {} archive files across {} versions",
        format!("{}", summary.production_files).cyan(),
        format!("{}", summary.archive_files).cyan(),
        format!("{}", summary.archive_versions).cyan(),
    );
    info!(
        "{} duplicate groups, {} files with lineage, {} missing components",
        format!("{}", summary.duplicates_found).yellow(),
        format!("{}", summary.files_with_lineage).cyan(),
        format!("{}", summary.missing_components).yellow(),
    );
    if summary.incomplete {
        info!(
            "{} {}",
            "Incomplete scan:".red().bold(),
            outcome.report.incomplete_sources.join(", ")
        );
    }
    for item in &outcome.report.critical_missing {
        info!("{} {}", "CRITICAL".red().bold(), item);
    }
}
