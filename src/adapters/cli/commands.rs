//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the GMGN token scanner.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::gmgn::{GmgnClient, GmgnClientConfig};
use crate::adapters::price_history::{CsvBarSource, TushareClient, TushareConfig};
use crate::adapters::rugcheck::{RugcheckClient, RugcheckConfig};
use crate::application::{
    run_showcase, RankedToken, TokenApi, DEFAULT_LIMIT, DEFAULT_MAX_RISK,
    DEFAULT_MIN_MARKET_CAP, DEFAULT_MIN_VOLUME, DEFAULT_TOKENS_PER_STEP,
};
use crate::config::{load_or_default, Config};
use crate::domain::filter::{CompositeFilter, FilterCriteria};
use crate::domain::format::{format_all, FormatterKind, RugcheckFormatter, TokenFormatter};
use crate::domain::query::{
    gainers_query, losers_query, volume_query, Chain, QueryParameters, SortCriteria, SortDirection, TimePeriod,
};
use crate::domain::rug_risk::RugcheckOutcome;
use crate::domain::token::Token;
use crate::domain::trend::{TrendReport, TRADE_DATE_FORMAT};
use crate::ports::PriceHistorySource;

/// Days of history the trend command covers when `--start` is omitted
const DEFAULT_TREND_DAYS: i64 = 365;

/// GMGN token scanner - ranking, filtering and rugcheck for meme tokens
#[derive(Parser, Debug)]
#[command(
    name = "gmgn-scanner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Token rankings, threshold filters and rugcheck scores from GMGN.ai",
    long_about = "Queries the GMGN.ai rank endpoint with rotating browser identities, \
                  filters the tokens by market thresholds and checks Solana mints \
                  against rugcheck.xyz. Also fits a linear trend over daily stock candles."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (defaults to ./config.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query one ranking with optional client-side filters
    Rank(RankCmd),

    /// Top tokens by volume
    TopVolume(PeriodCmd),

    /// Biggest price gainers for a window
    Gainers(PeriodCmd),

    /// Biggest price losers for a window
    Losers(PeriodCmd),

    /// Tokens above a minimum volume and market cap
    HighValue(HighValueCmd),

    /// Tokens passing all server-side safety filters
    Safe(CriteriaCmd),

    /// Small cap tokens (MC < $200K, liquidity < $150K, volume < $300K)
    SmallCap(CriteriaCmd),

    /// One ranking kept only where every per-criterion minimum holds
    Thresholds(ThresholdsCmd),

    /// Narrow through several rankings in order
    Sequential(SequentialCmd),

    /// Rugcheck a single Solana mint
    Rugcheck(RugcheckCmd),

    /// Tokens whose rugcheck risk score is below a maximum
    Verified(VerifiedCmd),

    /// Run every example query against Solana
    Demo,

    /// Linear regression trend over daily closes
    Trend(TrendCmd),
}

/// Options shared by every token listing
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Chain (eth, bsc, base, sol, tron)
    #[arg(long, value_name = "CHAIN", default_value = "sol")]
    pub chain: Chain,

    /// Maximum number of tokens to show
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Line format (general, volume, market-cap, gainers, small-cap, rugcheck)
    #[arg(long, value_name = "FORMAT", default_value = "general")]
    pub format: FormatterKind,

    /// Print tokens as JSON instead of formatted lines
    #[arg(long)]
    pub json: bool,
}

/// Full ranking query
#[derive(Parser, Debug)]
pub struct RankCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Ranking window (1m, 5m, 1h, 6h, 24h)
    #[arg(long, value_name = "PERIOD", default_value = "24h")]
    pub period: TimePeriod,

    /// Sort criterion
    #[arg(long, value_name = "CRITERIA", default_value = "volume")]
    pub criteria: SortCriteria,

    /// Sort direction (asc, desc)
    #[arg(long, value_name = "DIR", default_value = "desc")]
    pub direction: SortDirection,

    /// Enable the verified and renounced server-side filters too
    #[arg(long)]
    pub safe: bool,

    /// Drop the server-side not_honeypot filter
    #[arg(long)]
    pub no_honeypot_filter: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Client-side threshold flags
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, value_name = "USD")]
    pub min_volume: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub max_volume: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub min_market_cap: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub max_market_cap: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub min_liquidity: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub max_liquidity: Option<f64>,
    #[arg(long, value_name = "N")]
    pub min_holders: Option<u64>,
    /// Minimum 24h price change in percent
    #[arg(long, value_name = "PCT", allow_hyphen_values = true)]
    pub min_change: Option<f64>,
    /// Maximum 24h price change in percent
    #[arg(long, value_name = "PCT", allow_hyphen_values = true)]
    pub max_change: Option<f64>,
    #[arg(long, value_name = "DAYS")]
    pub min_age_days: Option<f64>,
    /// Keep tokens flagged as honeypots
    #[arg(long)]
    pub allow_honeypots: bool,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_volume: self.min_volume,
            max_volume: self.max_volume,
            min_market_cap: self.min_market_cap,
            max_market_cap: self.max_market_cap,
            min_liquidity: self.min_liquidity,
            max_liquidity: self.max_liquidity,
            min_holder_count: self.min_holders,
            min_price_change: self.min_change,
            max_price_change: self.max_change,
            min_age_days: self.min_age_days,
            exclude_honeypots: !self.allow_honeypots,
        }
    }
}

/// Listing over one ranking window
#[derive(Parser, Debug)]
pub struct PeriodCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Ranking window (1m, 5m, 1h, 6h, 24h); 24h for volume, 1h for price movers
    #[arg(long, value_name = "PERIOD")]
    pub period: Option<TimePeriod>,

    /// Keep only tokens with at least this 24h volume
    #[arg(long, value_name = "USD")]
    pub min_volume: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct HighValueCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, value_name = "USD", default_value_t = DEFAULT_MIN_VOLUME)]
    pub min_volume: f64,

    #[arg(long, value_name = "USD", default_value_t = DEFAULT_MIN_MARKET_CAP)]
    pub min_market_cap: f64,
}

#[derive(Parser, Debug)]
pub struct CriteriaCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Sort criterion
    #[arg(long, value_name = "CRITERIA", default_value = "volume")]
    pub criteria: SortCriteria,
}

#[derive(Parser, Debug)]
pub struct ThresholdsCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Criterion the ranking is sorted by
    #[arg(long, value_name = "CRITERIA", default_value = "volume")]
    pub primary: SortCriteria,

    /// Minimum as CRITERIA=VALUE, repeatable (e.g. --min marketcap=1000000)
    #[arg(long = "min", value_name = "CRITERIA=VALUE", value_parser = parse_threshold, required = true)]
    pub thresholds: Vec<(SortCriteria, f64)>,

    #[arg(long, value_name = "PERIOD", default_value = "24h")]
    pub period: TimePeriod,

    #[arg(long, value_name = "DIR", default_value = "desc")]
    pub direction: SortDirection,
}

#[derive(Parser, Debug)]
pub struct SequentialCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Comma-separated criteria applied in order
    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        default_values_t = [SortCriteria::Volume, SortCriteria::Marketcap, SortCriteria::HolderCount]
    )]
    pub criteria: Vec<SortCriteria>,

    #[arg(long, value_name = "PERIOD", default_value = "24h")]
    pub period: TimePeriod,

    /// Tokens kept after each step
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TOKENS_PER_STEP)]
    pub per_step: usize,
}

#[derive(Parser, Debug)]
pub struct RugcheckCmd {
    /// Token mint address
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    #[arg(long, value_name = "CHAIN", default_value = "sol")]
    pub chain: Chain,

    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct VerifiedCmd {
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, value_name = "CRITERIA", default_value = "volume")]
    pub criteria: SortCriteria,

    /// Highest accepted risk score in [0, 1]
    #[arg(long, value_name = "SCORE", default_value_t = DEFAULT_MAX_RISK)]
    pub max_risk: f64,
}

#[derive(Parser, Debug)]
pub struct TrendCmd {
    /// Tushare code (e.g. 000001.SZ)
    #[arg(long, value_name = "TS_CODE")]
    pub code: String,

    /// First trade date, YYYYMMDD or YYYY-MM-DD (default: one year before --end)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last trade date, YYYYMMDD or YYYY-MM-DD (default: today)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Read candles from a local CSV file instead of Tushare
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

/// Parse `criteria=value`
pub fn parse_threshold(raw: &str) -> Result<(SortCriteria, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CRITERIA=VALUE, got '{}'", raw))?;
    let criteria: SortCriteria = name.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid threshold value '{}'", value))?;
    Ok((criteria, value))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, TRADE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{}', expected YYYYMMDD or YYYY-MM-DD", raw))
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_or_default(app.config.as_deref()).context("Failed to load configuration")?;

    // Initialize logging based on flags
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Rank(cmd) => rank_command(&config, cmd).await,
        Command::TopVolume(cmd) => top_volume_command(&config, cmd).await,
        Command::Gainers(cmd) => gainers_command(&config, cmd, false).await,
        Command::Losers(cmd) => gainers_command(&config, cmd, true).await,
        Command::HighValue(cmd) => high_value_command(&config, cmd).await,
        Command::Safe(cmd) => safe_command(&config, cmd).await,
        Command::SmallCap(cmd) => small_cap_command(&config, cmd).await,
        Command::Thresholds(cmd) => thresholds_command(&config, cmd).await,
        Command::Sequential(cmd) => sequential_command(&config, cmd).await,
        Command::Rugcheck(cmd) => rugcheck_command(&config, cmd).await,
        Command::Verified(cmd) => verified_command(&config, cmd).await,
        Command::Demo => demo_command(&config).await,
        Command::Trend(cmd) => trend_command(&config, cmd).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_api(config: &Config) -> Result<TokenApi> {
    let gmgn = GmgnClient::with_config(GmgnClientConfig::from(&config.gmgn))
        .context("Failed to create GMGN client")?;
    let base_url = gmgn.base_url().to_string();
    let rugcheck = RugcheckClient::with_config(RugcheckConfig::from(&config.rugcheck))
        .context("Failed to create rugcheck client")?;

    Ok(TokenApi::new(Arc::new(gmgn), Arc::new(rugcheck), base_url))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_tokens(tokens: &[Token], output: &OutputArgs) -> Result<()> {
    if output.json {
        return print_json(tokens);
    }
    if tokens.is_empty() {
        println!("No tokens matched.");
        return Ok(());
    }
    let formatter = output.format.formatter();
    for line in format_all(tokens, formatter.as_ref()) {
        println!("{}", line);
    }
    Ok(())
}

/// Handle rank command
async fn rank_command(config: &Config, cmd: RankCmd) -> Result<()> {
    let api = build_api(config)?;

    let mut params = QueryParameters::new(cmd.output.chain, cmd.period, cmd.criteria).with_direction(cmd.direction);
    if cmd.safe {
        params = params.with_all_safety_filters();
    }
    if cmd.no_honeypot_filter {
        params.include_not_honeypot = false;
    }

    let filter = CompositeFilter::criteria_then_top(cmd.filter.criteria(), cmd.output.limit);
    let tokens = api
        .get_tokens_with_filter(&params, &filter)
        .await
        .context("Failed to fetch ranking")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle top-volume command
async fn top_volume_command(config: &Config, cmd: PeriodCmd) -> Result<()> {
    let api = build_api(config)?;
    let period = cmd.period.unwrap_or(TimePeriod::TwentyFourHours);
    let tokens = match cmd.min_volume {
        Some(min_volume) => {
            let params = volume_query(cmd.output.chain, period);
            let filter = CompositeFilter::criteria_then_top(FilterCriteria::min_volume(min_volume), cmd.output.limit);
            api.get_tokens_with_filter(&params, &filter).await
        }
        None => {
            api.get_top_volume_tokens(cmd.output.chain, period, cmd.output.limit)
                .await
        }
    }
    .context("Failed to fetch top volume tokens")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle gainers and losers commands
async fn gainers_command(config: &Config, mut cmd: PeriodCmd, losers: bool) -> Result<()> {
    let api = build_api(config)?;
    if cmd.output.format == FormatterKind::General {
        cmd.output.format = FormatterKind::Gainers;
    }
    let period = cmd.period.unwrap_or(TimePeriod::OneHour);

    let tokens = match cmd.min_volume {
        Some(min_volume) => {
            let params = if losers {
                losers_query(cmd.output.chain, period)
            } else {
                gainers_query(cmd.output.chain, period)
            };
            let filter = CompositeFilter::criteria_then_top(FilterCriteria::min_volume(min_volume), cmd.output.limit);
            api.get_tokens_with_filter(&params, &filter).await
        }
        None if losers => api.get_top_losers(cmd.output.chain, period, cmd.output.limit).await,
        None => api.get_top_gainers(cmd.output.chain, period, cmd.output.limit).await,
    }
    .context("Failed to fetch price movers")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle high-value command
async fn high_value_command(config: &Config, mut cmd: HighValueCmd) -> Result<()> {
    let api = build_api(config)?;
    if cmd.output.format == FormatterKind::General {
        cmd.output.format = FormatterKind::MarketCap;
    }

    let tokens = api
        .get_high_value_tokens(cmd.output.chain, cmd.min_volume, cmd.min_market_cap, cmd.output.limit)
        .await
        .context("Failed to fetch high value tokens")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle safe command
async fn safe_command(config: &Config, cmd: CriteriaCmd) -> Result<()> {
    let api = build_api(config)?;
    let tokens = api
        .get_safe_tokens(cmd.output.chain, cmd.criteria, cmd.output.limit)
        .await
        .context("Failed to fetch safe tokens")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle small-cap command
async fn small_cap_command(config: &Config, mut cmd: CriteriaCmd) -> Result<()> {
    let api = build_api(config)?;
    if cmd.output.format == FormatterKind::General {
        cmd.output.format = FormatterKind::SmallCap;
    }

    let tokens = api
        .get_small_cap_tokens(cmd.output.chain, cmd.criteria, cmd.output.limit)
        .await
        .context("Failed to fetch small cap tokens")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle thresholds command
async fn thresholds_command(config: &Config, cmd: ThresholdsCmd) -> Result<()> {
    let api = build_api(config)?;
    let mut tokens = api
        .get_threshold_rankings(cmd.output.chain, cmd.primary, cmd.thresholds, cmd.period, cmd.direction)
        .await
        .context("Failed to fetch threshold rankings")?;
    tokens.truncate(cmd.output.limit);

    print_tokens(&tokens, &cmd.output)
}

fn describe_ranks(ranked: &RankedToken) -> String {
    ranked
        .criteria_ranks
        .iter()
        .map(|(criteria, rank)| format!("{} #{}", criteria, rank))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handle sequential command
async fn sequential_command(config: &Config, cmd: SequentialCmd) -> Result<()> {
    let api = build_api(config)?;
    let mut ranked = api
        .get_sequential_rankings(cmd.output.chain, &cmd.criteria, cmd.period, cmd.per_step)
        .await
        .context("Failed to run sequential rankings")?;
    ranked.truncate(cmd.output.limit);

    if cmd.output.json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("No tokens survived every ranking.");
        return Ok(());
    }

    let formatter = cmd.output.format.formatter();
    for (i, entry) in ranked.iter().enumerate() {
        println!("{}", formatter.format(&entry.token, i + 1));
        println!("    Ranks: {}", describe_ranks(entry));
    }
    Ok(())
}

/// Handle rugcheck command
async fn rugcheck_command(config: &Config, cmd: RugcheckCmd) -> Result<()> {
    let api = build_api(config)?;
    let outcome = api.check_token_rug_risk(&cmd.address, cmd.chain).await;

    if cmd.json {
        return print_json(&outcome);
    }

    println!("Rugcheck for {}", cmd.address);
    println!("  {}", RugcheckFormatter::risk_label(&outcome));
    match &outcome {
        RugcheckOutcome::Checked(summary) => {
            println!("  Rugcheck score: {}", summary.rugcheck_score);
            println!("  Normalised score: {:.2}", summary.normalized_score);
            println!("  Rugged: {}", summary.is_rugged);
            for risk in summary.report.risks.iter().flatten() {
                println!("  - {} [{}]: {}", risk.name, risk.level, risk.description);
            }
            Ok(())
        }
        RugcheckOutcome::Failed { error } => Err(anyhow::anyhow!("Rugcheck failed: {}", error)),
    }
}

/// Handle verified command
async fn verified_command(config: &Config, mut cmd: VerifiedCmd) -> Result<()> {
    let api = build_api(config)?;
    if cmd.output.format == FormatterKind::General {
        cmd.output.format = FormatterKind::Rugcheck;
    }

    let tokens = api
        .get_rugcheck_verified_tokens(cmd.output.chain, cmd.criteria, cmd.output.limit, cmd.max_risk)
        .await
        .context("Failed to fetch rugcheck verified tokens")?;

    print_tokens(&tokens, &cmd.output)
}

/// Handle demo command
async fn demo_command(config: &Config) -> Result<()> {
    let api = build_api(config)?;
    let failures = run_showcase(&api).await;
    if failures > 0 {
        tracing::warn!("{} demo sections failed", failures);
    }
    Ok(())
}

/// Handle trend command
async fn trend_command(config: &Config, cmd: TrendCmd) -> Result<()> {
    let end = cmd.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = cmd
        .start
        .unwrap_or_else(|| end - ChronoDuration::days(DEFAULT_TREND_DAYS));
    if start > end {
        anyhow::bail!("--start {} is after --end {}", start, end);
    }

    let source: Box<dyn PriceHistorySource> = match &cmd.csv {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
            Box::new(CsvBarSource::new(expanded))
        }
        None => Box::new(
            TushareClient::with_config(TushareConfig::from(&config.tushare))
                .context("Failed to create Tushare client")?,
        ),
    };

    tracing::info!("Fetching daily bars for {} from {} to {}", cmd.code, start, end);
    let bars = source
        .daily_bars(&cmd.code, start, end)
        .await
        .with_context(|| format!("Failed to fetch daily bars for {}", cmd.code))?;

    let report = TrendReport::build(&cmd.code, bars).context("Failed to fit trend")?;
    for line in report.lines() {
        println!("{}", line);
    }
    Ok(())
}
