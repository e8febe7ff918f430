//! Token API
//!
//! Use cases over the ranking and rugcheck ports: fetch a ranking, run it
//! through filters and formatters, and cross-check tokens against rugcheck.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::adapters::gmgn::TokenDataParser;
use crate::domain::filter::{CompositeFilter, FilterCriteria, ThresholdFilter, TokenFilter, TopNFilter};
use crate::domain::format::{thousands, TokenFormatter};
use crate::domain::query::{
    gainers_query, losers_query, volume_query, Chain, QueryParameters, SortCriteria, SortDirection, TimePeriod,
};
use crate::domain::rug_risk::{RugcheckOutcome, RugcheckSummary};
use crate::domain::token::Token;
use crate::ports::{GmgnError, RankingSource, RugcheckPort};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_MAX_RISK: f64 = 0.3;
pub const DEFAULT_MIN_VOLUME: f64 = 500_000.0;
pub const DEFAULT_MIN_MARKET_CAP: f64 = 1_000_000.0;
pub const DEFAULT_TOKENS_PER_STEP: usize = 50;

/// Token that survived every step of a sequential ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedToken {
    pub token: Token,
    /// 1-based rank per criterion, in sequence order
    pub criteria_ranks: Vec<(SortCriteria, usize)>,
}

impl RankedToken {
    pub fn rank_for(&self, criteria: SortCriteria) -> Option<usize> {
        self.criteria_ranks
            .iter()
            .find(|(c, _)| *c == criteria)
            .map(|(_, rank)| *rank)
    }
}

/// Ranking, filtering and rugcheck use cases
pub struct TokenApi {
    source: Arc<dyn RankingSource>,
    rugcheck: Arc<dyn RugcheckPort>,
    parser: TokenDataParser,
    base_url: String,
}

impl TokenApi {
    pub fn new(
        source: Arc<dyn RankingSource>,
        rugcheck: Arc<dyn RugcheckPort>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            rugcheck,
            parser: TokenDataParser::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch and parse one ranking page
    pub async fn get_tokens(&self, params: &QueryParameters) -> Result<Vec<Token>, GmgnError> {
        let url = params.rank_url(&self.base_url);
        let url_params = params.to_url_params();

        tracing::info!(
            "Fetching tokens for {} with criteria {}",
            params.chain,
            params.criteria
        );

        let response = self.source.fetch_json(&url, &url_params).await?;
        self.parser.parse_response(&response)
    }

    pub async fn get_tokens_with_filter(
        &self,
        params: &QueryParameters,
        filter: &dyn TokenFilter,
    ) -> Result<Vec<Token>, GmgnError> {
        let tokens = self.get_tokens(params).await?;
        Ok(filter.filter(tokens))
    }

    pub async fn get_formatted_tokens(
        &self,
        params: &QueryParameters,
        formatter: &dyn TokenFormatter,
        filter: Option<&dyn TokenFilter>,
    ) -> Result<Vec<String>, GmgnError> {
        let mut tokens = self.get_tokens(params).await?;
        if let Some(filter) = filter {
            tokens = filter.filter(tokens);
        }
        Ok(tokens
            .iter()
            .enumerate()
            .map(|(i, token)| formatter.format(token, i + 1))
            .collect())
    }

    pub async fn get_top_volume_tokens(
        &self,
        chain: Chain,
        time_period: TimePeriod,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = volume_query(chain, time_period);
        self.get_tokens_with_filter(&params, &TopNFilter::new(limit)).await
    }

    pub async fn get_top_gainers(
        &self,
        chain: Chain,
        time_period: TimePeriod,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = gainers_query(chain, time_period);
        self.get_tokens_with_filter(&params, &TopNFilter::new(limit)).await
    }

    /// Biggest price drops first
    pub async fn get_top_losers(
        &self,
        chain: Chain,
        time_period: TimePeriod,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = losers_query(chain, time_period);
        self.get_tokens_with_filter(&params, &TopNFilter::new(limit)).await
    }

    pub async fn get_high_value_tokens(
        &self,
        chain: Chain,
        min_volume: f64,
        min_market_cap: f64,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = volume_query(chain, TimePeriod::TwentyFourHours);
        let filter = CompositeFilter::criteria_then_top(FilterCriteria::high_value(min_volume, min_market_cap), limit);
        self.get_tokens_with_filter(&params, &filter).await
    }

    /// 24h ranking with all three server-side safety filters
    pub async fn get_safe_tokens(
        &self,
        chain: Chain,
        criteria: SortCriteria,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = QueryParameters::new(chain, TimePeriod::TwentyFourHours, criteria).with_all_safety_filters();
        self.get_tokens_with_filter(&params, &TopNFilter::new(limit)).await
    }

    pub async fn get_small_cap_tokens(
        &self,
        chain: Chain,
        criteria: SortCriteria,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = QueryParameters::new(chain, TimePeriod::TwentyFourHours, criteria);
        let filter = CompositeFilter::criteria_then_top(FilterCriteria::small_cap(), limit);
        self.get_tokens_with_filter(&params, &filter).await
    }

    pub async fn get_filtered_tokens(
        &self,
        chain: Chain,
        filter_criteria: FilterCriteria,
        criteria: SortCriteria,
        limit: usize,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = QueryParameters::new(chain, TimePeriod::TwentyFourHours, criteria);
        let filter = CompositeFilter::criteria_then_top(filter_criteria, limit);
        self.get_tokens_with_filter(&params, &filter).await
    }

    /// Ranking by `primary`, keeping tokens that meet every per-criterion minimum
    pub async fn get_threshold_rankings(
        &self,
        chain: Chain,
        primary: SortCriteria,
        thresholds: Vec<(SortCriteria, f64)>,
        time_period: TimePeriod,
        direction: SortDirection,
    ) -> Result<Vec<Token>, GmgnError> {
        let filter = ThresholdFilter::new(thresholds).map_err(|e| GmgnError::InvalidRequest(e.to_string()))?;

        let described: Vec<String> = filter
            .thresholds()
            .iter()
            .map(|(c, v)| format!("{} >= ${}", c, thousands(*v)))
            .collect();
        tracing::info!("Filtering tokens by: {}", described.join(", "));
        tracing::info!("Primary sorting by: {}", primary);

        let params = QueryParameters::new(chain, time_period, primary).with_direction(direction);
        self.get_tokens_with_filter(&params, &filter).await
    }

    /// Narrow a ranking criterion by criterion, keeping tokens present in
    /// every later ranking and re-ordering them by that ranking.
    ///
    /// Tokens are matched by id. A token without one never survives a later step.
    pub async fn get_sequential_rankings(
        &self,
        chain: Chain,
        sequence: &[SortCriteria],
        time_period: TimePeriod,
        per_step: usize,
    ) -> Result<Vec<RankedToken>, GmgnError> {
        let (first, rest) = sequence
            .split_first()
            .ok_or_else(|| GmgnError::InvalidRequest("criteria sequence cannot be empty".to_string()))?;

        let names: Vec<&str> = sequence.iter().map(|c| c.as_str()).collect();
        tracing::info!("Sequential filtering with criteria: {}", names.join(", "));
        tracing::info!("Step 1: Getting top {} tokens by {}", per_step, first);

        let initial = self.get_tokens(&QueryParameters::new(chain, time_period, *first)).await?;
        let mut current: Vec<RankedToken> = initial
            .into_iter()
            .take(per_step)
            .enumerate()
            .map(|(i, token)| RankedToken {
                token,
                criteria_ranks: vec![(*first, i + 1)],
            })
            .collect();

        for (step, criteria) in rest.iter().enumerate() {
            tracing::info!("Step {}: Filtering by {}", step + 2, criteria);

            let ranking = self.get_tokens(&QueryParameters::new(chain, time_period, *criteria)).await?;
            if ranking.is_empty() {
                tracing::warn!("Empty ranking for {}, step skipped", criteria);
                continue;
            }

            // A repeated id takes its last position
            let mut ranks: HashMap<i64, usize> = HashMap::new();
            for (i, token) in ranking.iter().enumerate() {
                match token.id {
                    Some(id) => {
                        ranks.insert(id, i + 1);
                    }
                    None => tracing::debug!("Ranking item {} for {} has no id", i + 1, criteria),
                }
            }

            let mut kept: Vec<RankedToken> = current
                .into_iter()
                .filter_map(|mut ranked| {
                    let rank = *ranks.get(&ranked.token.id?)?;
                    ranked.criteria_ranks.push((*criteria, rank));
                    Some(ranked)
                })
                .collect();
            kept.sort_by_key(|r| r.rank_for(*criteria).unwrap_or(usize::MAX));
            kept.truncate(per_step);
            current = kept;

            tracing::info!("  Filtered to {} tokens", current.len());
        }

        Ok(current)
    }

    /// Rugcheck a single token; lookup failures come back as `Failed`
    pub async fn check_token_rug_risk(&self, address: &str, chain: Chain) -> RugcheckOutcome {
        if chain != Chain::Solana {
            tracing::warn!("Rugcheck may only support Solana tokens. Requested chain: {}", chain);
        }

        match self.rugcheck.fetch_report(address).await {
            Ok(report) => {
                tracing::info!("Rugcheck completed for {}", address);
                RugcheckOutcome::Checked(RugcheckSummary::from_report(report))
            }
            Err(e) => {
                tracing::error!("Rugcheck failed for {}: {}", address, e);
                RugcheckOutcome::Failed { error: e.to_string() }
            }
        }
    }

    pub async fn check_tokens_rug_risk(&self, tokens: &[Token], chain: Chain) -> HashMap<String, RugcheckOutcome> {
        let mut results = HashMap::with_capacity(tokens.len());
        for token in tokens {
            tracing::debug!("Checking rugcheck for {} ({})", token.symbol, token.address);
            let outcome = self.check_token_rug_risk(&token.address, chain).await;
            results.insert(token.address.clone(), outcome);
        }
        results
    }

    /// Tokens paired with their rugcheck outcome, or `None` when `check` is off
    pub async fn get_tokens_with_rugcheck(
        &self,
        params: &QueryParameters,
        check: bool,
    ) -> Result<Vec<(Token, Option<RugcheckOutcome>)>, GmgnError> {
        let tokens = self.get_tokens(params).await?;
        let mut paired = Vec::with_capacity(tokens.len());
        for token in tokens {
            let outcome = if check {
                Some(self.check_token_rug_risk(&token.address, params.chain).await)
            } else {
                None
            };
            paired.push((token, outcome));
        }
        Ok(paired)
    }

    /// Keep tokens whose rugcheck risk is at most `max_risk`, in input order
    pub async fn filter_safe_tokens_by_rugcheck(&self, tokens: Vec<Token>, chain: Chain, max_risk: f64) -> Vec<Token> {
        let mut safe = Vec::new();
        for token in tokens {
            let outcome = self.check_token_rug_risk(&token.address, chain).await;
            match &outcome {
                RugcheckOutcome::Failed { error } => {
                    tracing::warn!("Could not check {}: {}", token.symbol, error);
                }
                checked if checked.is_safe(max_risk) => {
                    tracing::debug!("Token {} passed rugcheck (risk: {:?})", token.symbol, checked.risk_score());
                    safe.push(token);
                }
                checked => {
                    tracing::debug!("Token {} failed rugcheck (risk: {:?})", token.symbol, checked.risk_score());
                }
            }
        }
        safe
    }

    /// Fetch `limit * 3` candidates, keep the rugcheck-safe ones, return at most `limit`
    pub async fn get_rugcheck_verified_tokens(
        &self,
        chain: Chain,
        criteria: SortCriteria,
        limit: usize,
        max_risk: f64,
    ) -> Result<Vec<Token>, GmgnError> {
        let params = QueryParameters::new(chain, TimePeriod::TwentyFourHours, criteria);
        let candidates = TopNFilter::new(limit.saturating_mul(3)).filter(self.get_tokens(&params).await?);

        let mut safe = self.filter_safe_tokens_by_rugcheck(candidates, chain, max_risk).await;
        safe.truncate(limit);
        Ok(safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::GeneralFormatter;
    use crate::domain::rug_risk::RugcheckReport;
    use crate::ports::ranking::MockRankingSource;
    use crate::ports::rugcheck::MockRugcheckPort;
    use crate::ports::RugcheckError;
    use serde_json::{json, Value};

    const BASE: &str = "https://gmgn.ai/defi/quotation/v1/rank";

    fn payload(items: Vec<Value>) -> Value {
        json!({"code": 0, "msg": "success", "data": {"rank": items}})
    }

    fn item(id: i64, symbol: &str, volume: f64, market_cap: f64) -> Value {
        json!({
            "id": id,
            "symbol": symbol,
            "address": format!("{}Mint", symbol),
            "price": 0.5,
            "volume": volume,
            "market_cap": market_cap,
        })
    }

    fn sample() -> Value {
        payload(vec![
            item(1, "AAA", 900_000.0, 2_000_000.0),
            item(2, "BBB", 50_000.0, 150_000.0),
            item(3, "CCC", 700_000.0, 1_500_000.0),
            item(4, "DDD", 300_000.0, 5_000_000.0),
        ])
    }

    fn api_with(source: MockRankingSource) -> TokenApi {
        TokenApi::new(Arc::new(source), Arc::new(MockRugcheckPort::new()), BASE)
    }

    fn symbols(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.symbol.as_str()).collect()
    }

    #[tokio::test]
    async fn test_get_tokens_builds_url_and_params() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .withf(|url, params| {
                url == "https://gmgn.ai/defi/quotation/v1/rank/sol/swaps/24h"
                    && params
                        == [
                            ("orderby".to_string(), "volume".to_string()),
                            ("direction".to_string(), "desc".to_string()),
                            ("filters[]".to_string(), "not_honeypot".to_string()),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(sample()));

        let api = api_with(source);
        let tokens = api
            .get_top_volume_tokens(Chain::Solana, TimePeriod::TwentyFourHours, 2)
            .await
            .unwrap();
        assert_eq!(symbols(&tokens), vec!["AAA", "BBB"]);
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .returning(|_, _| Err(GmgnError::cloudflare_block(403)));

        let err = api_with(source)
            .get_top_gainers(Chain::Solana, TimePeriod::OneHour, 5)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API Error 403: Cloudflare block detected");
    }

    #[tokio::test]
    async fn test_losers_ascending() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .withf(|url, params| {
                url.ends_with("/eth/swaps/5m")
                    && params[0].1 == "change5m"
                    && params[1].1 == "asc"
            })
            .returning(|_, _| Ok(sample()));

        let tokens = api_with(source)
            .get_top_losers(Chain::Ethereum, TimePeriod::FiveMinutes, 10)
            .await
            .unwrap();
        assert_eq!(tokens.len(), 4);
    }

    #[tokio::test]
    async fn test_high_value_and_formatted() {
        let mut source = MockRankingSource::new();
        source.expect_fetch_json().times(2).returning(|_, _| Ok(sample()));
        let api = api_with(source);

        let tokens = api
            .get_high_value_tokens(Chain::Solana, DEFAULT_MIN_VOLUME, DEFAULT_MIN_MARKET_CAP, 10)
            .await
            .unwrap();
        assert_eq!(symbols(&tokens), vec!["AAA", "CCC"]);

        let lines = api
            .get_formatted_tokens(&volume_query(Chain::Solana, TimePeriod::OneHour), &GeneralFormatter, None)
            .await
            .unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("  4. DDD - Price: $0.500000"));
    }

    #[tokio::test]
    async fn test_safe_tokens_use_all_filters_24h() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .withf(|url, params| {
                let filters: Vec<&str> = params
                    .iter()
                    .filter(|(k, _)| k == "filters[]")
                    .map(|(_, v)| v.as_str())
                    .collect();
                url.ends_with("/sol/swaps/24h") && filters == ["not_honeypot", "verified", "renounced"]
            })
            .returning(|_, _| Ok(sample()));

        let tokens = api_with(source)
            .get_safe_tokens(Chain::Solana, SortCriteria::Volume, 3)
            .await
            .unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[tokio::test]
    async fn test_threshold_rankings() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .withf(|_, params| params[0].1 == "marketcap")
            .returning(|_, _| Ok(sample()));
        let api = api_with(source);

        let tokens = api
            .get_threshold_rankings(
                Chain::Solana,
                SortCriteria::Marketcap,
                vec![(SortCriteria::Volume, 250_000.0), (SortCriteria::Marketcap, 1_800_000.0)],
                TimePeriod::TwentyFourHours,
                SortDirection::Descending,
            )
            .await
            .unwrap();
        assert_eq!(symbols(&tokens), vec!["AAA", "DDD"]);

        let err = api
            .get_threshold_rankings(
                Chain::Solana,
                SortCriteria::Marketcap,
                vec![],
                TimePeriod::TwentyFourHours,
                SortDirection::Descending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GmgnError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_sequential_rankings() {
        let mut source = MockRankingSource::new();
        source
            .expect_fetch_json()
            .withf(|_, params| params[0].1 == "volume")
            .returning(|_, _| Ok(sample()));
        source
            .expect_fetch_json()
            .withf(|_, params| params[0].1 == "marketcap")
            .returning(|_, _| {
                Ok(payload(vec![
                    item(4, "DDD", 0.0, 0.0),
                    item(9, "ZZZ", 0.0, 0.0),
                    item(3, "CCC", 0.0, 0.0),
                    item(1, "AAA", 0.0, 0.0),
                ]))
            });
        source
            .expect_fetch_json()
            .withf(|_, params| params[0].1 == "swaps")
            .returning(|_, _| Ok(payload(vec![])));

        let ranked = api_with(source)
            .get_sequential_rankings(
                Chain::Solana,
                &[SortCriteria::Volume, SortCriteria::Marketcap, SortCriteria::Swaps],
                TimePeriod::TwentyFourHours,
                3,
            )
            .await
            .unwrap();

        let ids: Vec<i64> = ranked.iter().filter_map(|r| r.token.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(ranked[0].rank_for(SortCriteria::Marketcap), Some(3));
        assert_eq!(ranked[0].rank_for(SortCriteria::Volume), Some(3));
        assert_eq!(ranked[1].rank_for(SortCriteria::Marketcap), Some(4));
        assert_eq!(ranked[0].rank_for(SortCriteria::Swaps), None);
    }

    #[tokio::test]
    async fn test_sequential_requires_criteria() {
        let api = api_with(MockRankingSource::new());
        let err = api
            .get_sequential_rankings(Chain::Solana, &[], TimePeriod::OneHour, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GmgnError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_rugcheck_outcomes() {
        let mut rugcheck = MockRugcheckPort::new();
        rugcheck.expect_fetch_report().returning(|mint| match mint {
            "AAAMint" => Ok(RugcheckReport {
                mint: mint.to_string(),
                score_normalised: Some(0.9),
                ..Default::default()
            }),
            "CCCMint" => Ok(RugcheckReport {
                mint: mint.to_string(),
                rugged: true,
                ..Default::default()
            }),
            _ => Err(RugcheckError::Api {
                status: 404,
                message: "not found".to_string(),
            }),
        });

        let mut source = MockRankingSource::new();
        source.expect_fetch_json().returning(|_, _| Ok(sample()));

        let api = TokenApi::new(Arc::new(source), Arc::new(rugcheck), BASE);

        let failed = api.check_token_rug_risk("BBBMint", Chain::Ethereum).await;
        assert!(matches!(failed, RugcheckOutcome::Failed { .. }));

        let verified = api
            .get_rugcheck_verified_tokens(Chain::Solana, SortCriteria::Volume, 1, DEFAULT_MAX_RISK)
            .await
            .unwrap();
        assert_eq!(symbols(&verified), vec!["AAA"]);

        let params = volume_query(Chain::Solana, TimePeriod::TwentyFourHours);
        let paired = api.get_tokens_with_rugcheck(&params, true).await.unwrap();
        assert_eq!(paired.len(), 4);
        assert!(paired[2].1.as_ref().is_some_and(|o| o.risk_score() == Some(1.0)));

        let unchecked = api.get_tokens_with_rugcheck(&params, false).await.unwrap();
        assert!(unchecked.iter().all(|(_, o)| o.is_none()));

        let tokens: Vec<Token> = paired.into_iter().map(|(t, _)| t).collect();
        let by_address = api.check_tokens_rug_risk(&tokens, Chain::Solana).await;
        assert_eq!(by_address.len(), 4);
        assert!(by_address["AAAMint"].is_safe(0.2));
    }

    #[test]
    fn test_volume_floor_then_top() {
        let tokens = vec![
            Token { symbol: "A".into(), volume: 200_000.0, ..Default::default() },
            Token { symbol: "B".into(), volume: 10.0, ..Default::default() },
            Token { symbol: "C".into(), volume: 150_000.0, ..Default::default() },
        ];
        let filter = CompositeFilter::criteria_then_top(FilterCriteria::min_volume(100_000.0), 2);
        assert_eq!(symbols(&filter.filter(tokens)), vec!["A", "C"]);
    }
}
