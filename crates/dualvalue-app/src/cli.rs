//! # Command Line Interface
//!
//! `dualvalue evaluate` ranks a roster or player pool; `dualvalue compare`
//! puts two players side by side.

use crate::report::{
    write_comparison_text, write_evaluation_text, write_json, ComparisonReport, EvaluationReport,
};
use crate::roster::{find_player, load_roster};
use crate::settings::load_engine_config;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use dualvalue_baseball::config::EngineConfig;
use dualvalue_baseball::player::Role;
use dualvalue_baseball::valuation::{compare_players, evaluate_batch, BatchOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Dynasty baseball dual-value evaluator
#[derive(Debug, Parser)]
#[command(name = "dualvalue", version)]
#[command(about = "Compare fantasy output against underlying skill to find buy-low and sell-high players")]
pub struct Cli {
    /// Path to evaluator.toml (defaults: ./config, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate every player in a roster CSV and rank candidates
    Evaluate {
        /// Roster or player-pool CSV
        roster: PathBuf,

        /// Only evaluate one role; others are reported as skipped
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// Confidence floor for ranked lists (defaults to the configured threshold)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Maximum entries per ranked list
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Compare two players from the same roster CSV
    Compare {
        /// Roster or player-pool CSV
        roster: PathBuf,
        /// First player (name or ID)
        first: String,
        /// Second player (name or ID)
        second: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Batter,
    Pitcher,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Batter => Role::Batter,
            RoleArg::Pitcher => Role::Pitcher,
        }
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Execute a parsed command line, writing the report to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = load_engine_config(cli.config.as_deref()).context("failed to load configuration")?;
    run_with_config(cli, &config, out)
}

/// Same as [`run`] with an already-loaded config.
pub fn run_with_config(cli: Cli, config: &EngineConfig, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Evaluate {
            roster,
            role,
            min_confidence,
            limit,
        } => {
            let rows = load_roster(&roster).context("failed to load roster")?;
            info!("Loaded {} rows from {}", rows.len(), roster.display());

            let mut options = BatchOptions::from_thresholds(&config.thresholds);
            options.role = role.map(Role::from);
            options.limit = limit;
            if let Some(min) = min_confidence {
                if !(0.0..=1.0).contains(&min) {
                    bail!("--min-confidence must be between 0 and 1, got {min}");
                }
                options.min_confidence = min;
            }

            let batch = evaluate_batch(&rows, config, &options);
            let report = EvaluationReport {
                generated_at: Utc::now(),
                source: source_name(&roster),
                batch: &batch,
            };
            if cli.json {
                write_json(out, &report)?;
            } else {
                write_evaluation_text(out, &report)?;
            }
        }
        Commands::Compare {
            roster,
            first,
            second,
        } => {
            let rows = load_roster(&roster).context("failed to load roster")?;
            let a = find_player(&rows, &first)
                .with_context(|| format!("player '{first}' not found in {}", roster.display()))?;
            let b = find_player(&rows, &second)
                .with_context(|| format!("player '{second}' not found in {}", roster.display()))?;

            let comparison = compare_players(a, b, config)?;
            let report = ComparisonReport {
                generated_at: Utc::now(),
                source: source_name(&roster),
                comparison: &comparison,
            };
            if cli.json {
                write_json(out, &report)?;
            } else {
                write_comparison_text(out, &report)?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "dualvalue",
            "evaluate",
            "pool.csv",
            "--role",
            "pitcher",
            "--limit",
            "10",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Evaluate { roster, role, limit, min_confidence } => {
                assert_eq!(roster, PathBuf::from("pool.csv"));
                assert_eq!(role, Some(RoleArg::Pitcher));
                assert_eq!(limit, Some(10));
                assert_eq!(min_confidence, None);
            }
            other => panic!("expected Evaluate, got {other:?}"),
        }
    }

    #[test]
    fn parses_compare_with_global_config() {
        let cli = Cli::try_parse_from([
            "dualvalue",
            "--config",
            "my.toml",
            "compare",
            "pool.csv",
            "Player A",
            "Player B",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Commands::Compare { ref first, .. } if first == "Player A"));
    }

    #[test]
    fn compare_requires_two_players() {
        assert!(Cli::try_parse_from(["dualvalue", "compare", "pool.csv", "Only One"]).is_err());
    }

    #[test]
    fn role_arg_maps_to_role() {
        assert_eq!(Role::from(RoleArg::Batter), Role::Batter);
        assert_eq!(Role::from(RoleArg::Pitcher), Role::Pitcher);
    }
}
