mod cli;
mod config;
mod error;
mod evidence;
mod explain;
mod gates;
mod rank;
mod report;
mod scoring;
mod summary;
mod types;

use crate::error::ScoutError;
use crate::evidence::load_snapshot;
use crate::report::OutputFormat;
use crate::types::config::ScoringModel;
use crate::types::report::{GateListing, ScoreReport};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn output_format(format: cli::ReportFormat) -> OutputFormat {
    match format {
        cli::ReportFormat::Json => OutputFormat::Json,
        cli::ReportFormat::Md => OutputFormat::Md,
    }
}

fn load_model(explicit: Option<&Path>) -> Result<ScoringModel, ScoutError> {
    let root = std::env::current_dir()?;
    config::load_config(&root, explicit)
}

fn score(snapshot: &Path, model: &ScoringModel) -> Result<ScoreReport, ScoutError> {
    let loaded = load_snapshot(snapshot)?;
    Ok(scoring::score_snapshot(&loaded, model))
}

fn completed(report: &ScoreReport) -> i32 {
    let warnings = report.warning_count();
    if warnings > 0 {
        eprintln!("warning: {warnings} data inconsistencies recorded, affected records excluded");
        exit_code::WARNINGS
    } else {
        exit_code::SUCCESS
    }
}

fn run(cli: cli::Cli) -> Result<i32, ScoutError> {
    init_tracing(cli.verbose, cli.quiet);
    let model = load_model(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Score(cmd) => {
            let scored = score(&cmd.snapshot, &model)?;
            println!("{}", report::render(&scored, output_format(cmd.format))?);
            Ok(completed(&scored))
        }
        cli::Commands::Rank(cmd) => {
            let scored = score(&cmd.snapshot, &model)?;
            let listing = rank::rank(&scored, &model, &cmd.lens, cmd.top)?;
            println!("{}", report::render(&listing, output_format(cmd.format))?);
            Ok(completed(&scored))
        }
        cli::Commands::Gates(cmd) => {
            let scored = score(&cmd.snapshot, &model)?;
            let listing = GateListing::from_report(&scored, cmd.initiative);
            println!("{}", report::render(&listing, output_format(cmd.format))?);
            Ok(completed(&scored))
        }
        cli::Commands::Explain(cmd) => {
            let scored = score(&cmd.snapshot, &model)?;
            let explanation =
                explain::explain(&scored, cmd.initiative, &cmd.dimension, cmd.top_k)?;
            println!("{}", report::render(&explanation, output_format(cmd.format))?);
            Ok(completed(&scored))
        }
        cli::Commands::Summary(cmd) => {
            let scored = score(&cmd.snapshot, &model)?;
            let quality = summary::summarize(&scored, cmd.top_blockers)?;
            println!("{}", report::render(&quality, output_format(cmd.format))?);
            Ok(completed(&scored))
        }
        cli::Commands::CheckConfig => {
            println!(
                "config ok: {} dimensions, {} lenses ({})",
                model.dimensions.len(),
                model.lenses.len(),
                model.lenses.keys().cloned().collect::<Vec<_>>().join(", ")
            );
            Ok(exit_code::SUCCESS)
        }
    }
}

/// Usage errors are caller errors; `--help` and `--version` still exit 0.
fn parse_cli() -> cli::Cli {
    match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_code::RUNTIME_FAILURE
            } else {
                exit_code::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

fn main() {
    match run(parse_cli()) {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            let code = if e.is_config() {
                exit_code::CONFIG_ERROR
            } else {
                exit_code::RUNTIME_FAILURE
            };
            std::process::exit(code);
        }
    }
}
