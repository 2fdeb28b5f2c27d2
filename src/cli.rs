use crate::explain::DEFAULT_TOP_K;
use crate::rank::DEFAULT_TOP_N;
use crate::summary::DEFAULT_TOP_BLOCKERS;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Deterministic scoring, gating and ranking of student initiatives"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use this config file instead of scout.toml discovery
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every initiative in a snapshot
    Score(ScoreCommand),
    /// Top-N initiatives for one lens
    Rank(RankCommand),
    /// Gate A-D results with blockers
    Gates(GatesCommand),
    /// Top contributing components of one dimension
    Explain(ExplainCommand),
    /// Gate pass rates, frequent blockers and score distributions
    Summary(SummaryCommand),
    /// Validate the layered configuration and exit
    CheckConfig,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// Snapshot file or directory of snapshot files
    pub snapshot: PathBuf,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct RankCommand {
    pub snapshot: PathBuf,
    #[arg(long)]
    pub lens: String,
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct GatesCommand {
    pub snapshot: PathBuf,
    #[arg(long)]
    pub initiative: Option<u64>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct ExplainCommand {
    pub snapshot: PathBuf,
    #[arg(long)]
    pub initiative: u64,
    #[arg(long)]
    pub dimension: String,
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct SummaryCommand {
    pub snapshot: PathBuf,
    #[arg(long, default_value_t = DEFAULT_TOP_BLOCKERS)]
    pub top_blockers: usize,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rank_parses_lens_and_top() {
        let cli = Cli::try_parse_from([
            "scout",
            "-v",
            "rank",
            "snap.json",
            "--lens",
            "conviction",
            "--top",
            "5",
        ])
        .expect("arguments should parse");
        assert_eq!(cli.verbose, 1);
        let Commands::Rank(cmd) = cli.command else {
            panic!("expected rank command");
        };
        assert_eq!(cmd.lens, "conviction");
        assert_eq!(cmd.top, 5);
    }

    #[test]
    fn explain_requires_initiative_and_dimension() {
        let result =
            Cli::try_parse_from(["scout", "explain", "snap.json", "--dimension", "tech_dd"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["scout", "-q", "-v", "check-config"]);
        assert!(result.is_err());
    }
}
