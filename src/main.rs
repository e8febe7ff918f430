//! GMGN Token Scanner
//!
//! Ranks, filters and rugchecks tokens from GMGN.ai on the command line.

use anyhow::Result;
use clap::Parser;

use gmgn_scanner::adapters::cli::{self, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (TUSHARE_TOKEN goes here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    cli::execute(app).await
}
