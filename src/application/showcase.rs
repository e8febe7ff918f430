//! Demo run
//!
//! Walks through the main use cases on Solana and prints each result block.
//! A failing section is reported and the run moves on.

use crate::domain::filter::{CompositeFilter, FilterCriteria};
use crate::domain::format::{
    GainersFormatter, GeneralFormatter, MarketCapFormatter, RugcheckFormatter, SmallCapFormatter, TokenFormatter,
    VolumeFormatter,
};
use crate::domain::query::{gainers_query, Chain, SortCriteria, TimePeriod};
use crate::domain::rug_risk::RugcheckOutcome;
use crate::domain::token::Token;
use crate::ports::GmgnError;

use super::token_api::TokenApi;

const RULE_WIDTH: usize = 50;

fn print_tokens(tokens: &[Token], formatter: &dyn TokenFormatter) {
    if tokens.is_empty() {
        println!("  (no tokens matched)");
    }
    for (i, token) in tokens.iter().enumerate() {
        println!("{}", formatter.format(token, i + 1));
    }
}

fn print_rule() {
    println!("\n{}\n", "=".repeat(RULE_WIDTH));
}

fn report(section: &str, result: Result<(), GmgnError>) {
    if let Err(e) = result {
        tracing::error!("{} failed: {}", section, e);
        println!("  {} failed: {}", section, e);
    }
}

/// Print all eight demo sections; returns the number of sections that failed
pub async fn run_showcase(api: &TokenApi) -> usize {
    let chain = Chain::Solana;
    let mut failures = 0;
    let mut track = |section: &str, result: Result<(), GmgnError>| {
        if result.is_err() {
            failures += 1;
        }
        report(section, result);
    };

    println!("=== GMGN Token Scanner ===\n");

    println!("1. Top 5 Solana tokens by volume:");
    let result = async {
        let tokens = api.get_top_volume_tokens(chain, TimePeriod::TwentyFourHours, 5).await?;
        print_tokens(&tokens, &VolumeFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Top volume", result);
    print_rule();

    println!("2. Top gainers with high volume (>$100k):");
    let result = async {
        let params = gainers_query(chain, TimePeriod::OneHour);
        let filter = CompositeFilter::criteria_then_top(FilterCriteria::min_volume(100_000.0), 3);
        let tokens = api.get_tokens_with_filter(&params, &filter).await?;
        print_tokens(&tokens, &GainersFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Gainers", result);
    print_rule();

    println!("3. High-value tokens (Min Vol: $1M, Min MC: $5M):");
    let result = async {
        let tokens = api.get_high_value_tokens(chain, 1_000_000.0, 5_000_000.0, 3).await?;
        print_tokens(&tokens, &MarketCapFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("High value", result);
    print_rule();

    println!("4. Safe tokens (all filters applied):");
    let result = async {
        let tokens = api.get_safe_tokens(chain, SortCriteria::Volume, 3).await?;
        print_tokens(&tokens, &GeneralFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Safe tokens", result);
    print_rule();

    println!("5. Small cap tokens (MC < $200K, Vol < $300K):");
    let result = async {
        let tokens = api.get_small_cap_tokens(chain, SortCriteria::Volume, 3).await?;
        print_tokens(&tokens, &SmallCapFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Small cap", result);
    print_rule();

    println!("6. Custom filtered tokens (MC < $100K, Vol < $200K):");
    let result = async {
        let criteria = FilterCriteria {
            max_market_cap: Some(100_000.0),
            max_volume: Some(200_000.0),
            ..Default::default()
        };
        let tokens = api.get_filtered_tokens(chain, criteria, SortCriteria::Volume, 3).await?;
        print_tokens(&tokens, &SmallCapFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Custom filter", result);
    print_rule();

    println!("7. Rugcheck verified tokens (risk score < 0.3):");
    let result = async {
        let tokens = api
            .get_rugcheck_verified_tokens(chain, SortCriteria::Volume, 3, 0.3)
            .await?;
        print_tokens(&tokens, &RugcheckFormatter);
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Rugcheck verified", result);
    print_rule();

    println!("8. Individual token rugcheck:");
    let result = async {
        let tokens = api.get_top_volume_tokens(chain, TimePeriod::TwentyFourHours, 1).await?;
        match tokens.first() {
            Some(token) => {
                let outcome = api.check_token_rug_risk(&token.address, chain).await;
                println!("{}", RugcheckFormatter.format_with_rugcheck(token, &outcome, 1));
                if let RugcheckOutcome::Checked(summary) = &outcome {
                    println!(
                        "    Detailed info: risk {:.2} | rugcheck score {} | normalised {:.2} | rugged {} | {} risks",
                        summary.risk_score,
                        summary.rugcheck_score,
                        summary.normalized_score,
                        summary.is_rugged,
                        summary.report.risks.as_ref().map_or(0, Vec::len)
                    );
                }
            }
            None => println!("No tokens available for rugcheck"),
        }
        Ok::<(), GmgnError>(())
    }
    .await;
    track("Individual rugcheck", result);

    println!("\nExamples completed.");
    failures
}
