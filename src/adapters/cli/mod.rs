//! CLI Adapter
//!
//! Command-line interface for the GMGN token scanner.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    parse_date, parse_threshold, CliApp, Command, CriteriaCmd, FilterArgs, HighValueCmd, OutputArgs, PeriodCmd,
    RankCmd, RugcheckCmd, SequentialCmd, ThresholdsCmd, TrendCmd, VerifiedCmd,
};

use anyhow::Result;

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
