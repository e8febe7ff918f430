//! Token Formatters
//!
//! One-line console renderings of a token, each focused on a different metric.

use num_format::{Locale, ToFormattedString};

use super::rug_risk::RugcheckOutcome;
use super::token::Token;

/// Renders a token as a numbered display line
pub trait TokenFormatter: Send + Sync {
    fn format(&self, token: &Token, index: usize) -> String;
}

/// Whole dollars with thousands separators
pub fn thousands(value: f64) -> String {
    (value.round() as i64).to_formatted_string(&Locale::en)
}

/// `$X.XXM` from one million up, otherwise `$N,NNN`
pub fn compact_millions(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else {
        format!("${}", thousands(value))
    }
}

/// `$X.XXM`, `$NK` or `$N`
pub fn compact_short(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.0}K", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralFormatter;

impl TokenFormatter for GeneralFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - Price: ${:.6} | 24h: {:.2}% | Volume: ${}",
            index,
            token.symbol,
            token.price,
            token.price_change_percent,
            thousands(token.volume)
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeFormatter;

impl TokenFormatter for VolumeFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - Volume: {} | Price: ${:.6}",
            index,
            token.symbol,
            compact_millions(token.volume),
            token.price
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarketCapFormatter;

impl TokenFormatter for MarketCapFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - MC: {} | Price: ${:.6}",
            index,
            token.symbol,
            compact_millions(token.market_cap),
            token.price
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GainersFormatter;

impl TokenFormatter for GainersFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - 1h: {:.2}% | 24h: {:.2}% | Price: ${:.6}",
            index, token.symbol, token.price_change_percent1h, token.price_change_percent, token.price
        )
    }
}

/// Market cap, liquidity and volume side by side
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallCapFormatter;

impl TokenFormatter for SmallCapFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - MC: {} | Liq: {} | Vol: {} | Price: ${:.6}",
            index,
            token.symbol,
            compact_short(token.market_cap),
            compact_short(token.liquidity),
            compact_short(token.volume),
            token.price
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RugcheckFormatter;

impl RugcheckFormatter {
    pub fn risk_label(outcome: &RugcheckOutcome) -> String {
        match outcome {
            RugcheckOutcome::Failed { .. } => "❌ Error".to_string(),
            RugcheckOutcome::Checked(summary) => {
                let risk = summary.risk_score;
                if risk <= 0.2 {
                    format!("✅ Low Risk ({:.2})", risk)
                } else if risk <= 0.5 {
                    format!("⚠️ Medium Risk ({:.2})", risk)
                } else {
                    format!("🚨 High Risk ({:.2})", risk)
                }
            }
        }
    }

    pub fn format_with_rugcheck(&self, token: &Token, outcome: &RugcheckOutcome, index: usize) -> String {
        format!(
            "  {}. {} - {} | Price: ${:.6} | Vol: ${}",
            index,
            token.symbol,
            Self::risk_label(outcome),
            token.price,
            thousands(token.volume)
        )
    }
}

impl TokenFormatter for RugcheckFormatter {
    fn format(&self, token: &Token, index: usize) -> String {
        format!(
            "  {}. {} - Price: ${:.6} | Vol: ${}",
            index,
            token.symbol,
            token.price,
            thousands(token.volume)
        )
    }
}

/// Formatter selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    #[default]
    General,
    Volume,
    MarketCap,
    Gainers,
    SmallCap,
    Rugcheck,
}

impl FormatterKind {
    pub fn formatter(self) -> Box<dyn TokenFormatter> {
        match self {
            FormatterKind::General => Box::new(GeneralFormatter),
            FormatterKind::Volume => Box::new(VolumeFormatter),
            FormatterKind::MarketCap => Box::new(MarketCapFormatter),
            FormatterKind::Gainers => Box::new(GainersFormatter),
            FormatterKind::SmallCap => Box::new(SmallCapFormatter),
            FormatterKind::Rugcheck => Box::new(RugcheckFormatter),
        }
    }
}

impl std::str::FromStr for FormatterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "general" => Ok(FormatterKind::General),
            "volume" => Ok(FormatterKind::Volume),
            "marketcap" | "mc" => Ok(FormatterKind::MarketCap),
            "gainers" => Ok(FormatterKind::Gainers),
            "smallcap" => Ok(FormatterKind::SmallCap),
            "rugcheck" => Ok(FormatterKind::Rugcheck),
            _ => Err(format!(
                "invalid formatter '{}', expected one of: general, volume, market-cap, gainers, small-cap, rugcheck",
                s
            )),
        }
    }
}

/// Render a list with 1-based indices
pub fn format_all(tokens: &[Token], formatter: &dyn TokenFormatter) -> Vec<String> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| formatter.format(token, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rug_risk::{RugcheckReport, RugcheckSummary};
    use regex::Regex;

    fn token() -> Token {
        Token {
            symbol: "PEPE".to_string(),
            price: 0.00012345,
            volume: 1_234_567.4,
            liquidity: 45_600.0,
            market_cap: 987_654.0,
            price_change_percent: 12.5,
            price_change_percent1h: -4.2,
            ..Default::default()
        }
    }

    fn checked(score_normalised: f64) -> RugcheckOutcome {
        RugcheckOutcome::Checked(RugcheckSummary::from_report(RugcheckReport {
            score_normalised: Some(score_normalised),
            ..Default::default()
        }))
    }

    #[test]
    fn test_general() {
        assert_eq!(
            GeneralFormatter.format(&token(), 1),
            "  1. PEPE - Price: $0.000123 | 24h: 12.50% | Volume: $1,234,567"
        );
    }

    #[test]
    fn test_volume_and_market_cap_compaction() {
        assert_eq!(
            VolumeFormatter.format(&token(), 2),
            "  2. PEPE - Volume: $1.23M | Price: $0.000123"
        );
        assert_eq!(
            MarketCapFormatter.format(&token(), 3),
            "  3. PEPE - MC: $987,654 | Price: $0.000123"
        );
    }

    #[test]
    fn test_gainers() {
        assert_eq!(
            GainersFormatter.format(&token(), 4),
            "  4. PEPE - 1h: -4.20% | 24h: 12.50% | Price: $0.000123"
        );
    }

    #[test]
    fn test_small_cap_units() {
        assert_eq!(compact_short(2_500_000.0), "$2.50M");
        assert_eq!(compact_short(45_600.0), "$46K");
        assert_eq!(compact_short(999.0), "$999");
        assert_eq!(
            SmallCapFormatter.format(&token(), 5),
            "  5. PEPE - MC: $988K | Liq: $46K | Vol: $1.23M | Price: $0.000123"
        );
    }

    #[test]
    fn test_rugcheck_bands() {
        let f = RugcheckFormatter;
        let t = token();
        assert!(f.format_with_rugcheck(&t, &checked(0.9), 1).contains("✅ Low Risk (0.10)"));
        assert!(f.format_with_rugcheck(&t, &checked(0.6), 1).contains("⚠️ Medium Risk (0.40)"));
        assert!(f.format_with_rugcheck(&t, &checked(0.2), 1).contains("🚨 High Risk (0.80)"));

        let failed = RugcheckOutcome::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(
            f.format_with_rugcheck(&t, &failed, 7),
            "  7. PEPE - ❌ Error | Price: $0.000123 | Vol: $1,234,567"
        );
    }

    #[test]
    fn test_line_shape() {
        let shape = Regex::new(r"^  \d+\. \S+ - Price: \$\d+\.\d{6} \| Vol: \$[\d,]+$").unwrap();
        let lines = format_all(&[token(), token()], &RugcheckFormatter);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| shape.is_match(l)));
        assert!(lines[1].starts_with("  2. "));
    }

    #[test]
    fn test_formatter_kind_parse() {
        assert_eq!("market-cap".parse::<FormatterKind>().unwrap(), FormatterKind::MarketCap);
        assert_eq!("small_cap".parse::<FormatterKind>().unwrap(), FormatterKind::SmallCap);
        assert!("fancy".parse::<FormatterKind>().is_err());
    }
}
