//! Local CSV price history
//!
//! Reads Tushare-shaped exports (`ts_code,trade_date,open,high,low,close,vol`).

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::tushare::parse_trade_date;
use crate::domain::trend::DailyBar;
use crate::ports::{PriceHistoryError, PriceHistorySource};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    ts_code: Option<String>,
    trade_date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(alias = "volume")]
    vol: f64,
}

/// Price history read from a CSV file
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    path: PathBuf,
}

impl CsvBarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse CSV content, keeping rows for `ts_code` (or rows without a code)
    pub fn parse(content: &str, ts_code: &str) -> Result<Vec<DailyBar>, PriceHistoryError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut bars = Vec::new();
        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            if row.ts_code.as_deref().is_some_and(|code| !code.is_empty() && code != ts_code) {
                continue;
            }
            bars.push(DailyBar {
                trade_date: parse_trade_date(&row.trade_date)?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.vol,
            });
        }
        Ok(bars)
    }
}

#[async_trait]
impl PriceHistorySource for CsvBarSource {
    async fn daily_bars(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, PriceHistoryError> {
        tracing::info!("Reading daily bars for {} from {}", ts_code, self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let bars = Self::parse(&content, ts_code)?
            .into_iter()
            .filter(|b| b.trade_date >= start && b.trade_date <= end)
            .collect();
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
ts_code,trade_date,open,high,low,close,pre_close,vol
600004.SH,20250103,10.0,10.4,9.9,10.3,10.0,1500
600004.SH,20250102,9.8,10.1,9.7,10.0,9.8,1200
000001.SZ,20250102,11.0,11.2,10.9,11.1,11.0,900
600004.SH,20250101,9.5,9.9,9.4,9.8,9.5,1000
";

    #[test]
    fn test_parse_filters_code() {
        let bars = CsvBarSource::parse(SAMPLE, "600004.SH").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 10.3);
        assert_eq!(bars[2].volume, 1000.0);
    }

    #[test]
    fn test_parse_without_code_column() {
        let content = "trade_date,open,high,low,close,volume\n20250101,1,2,0.5,1.5,10\n";
        let bars = CsvBarSource::parse(content, "ANY").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 10.0);
    }

    #[test]
    fn test_bad_row() {
        let content = "trade_date,open,high,low,close,vol\n20250101,x,2,0.5,1.5,10\n";
        assert!(matches!(CsvBarSource::parse(content, "ANY"), Err(PriceHistoryError::Csv(_))));
    }

    #[tokio::test]
    async fn test_reads_file_within_range() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CsvBarSource::new(file.path());
        let bars = source
            .daily_bars(
                "600004.SH",
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = CsvBarSource::new("/nonexistent/bars.csv");
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(
            source.daily_bars("X", day, day).await,
            Err(PriceHistoryError::Io(_))
        ));
    }
}
