//! Price Trend
//!
//! Least-squares line through daily closes, x = trading day index.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;

/// Date layout used by Tushare and the CSV files
pub const TRADE_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrendError {
    #[error("Need at least 2 daily bars for a regression, got {0}")]
    NotEnoughBars(usize),
}

/// One daily candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub trade_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
            Trend::Flat => write!(f, "flat"),
        }
    }
}

/// Fitted `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    pub points: usize,
}

impl RegressionLine {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn trend(&self) -> Trend {
        if self.slope.abs() < f64::EPSILON {
            Trend::Flat
        } else if self.slope > 0.0 {
            Trend::Rising
        } else {
            Trend::Falling
        }
    }
}

/// Sort bars by date and fit a line through their closes
pub fn fit_close_regression(bars: &mut [DailyBar]) -> Result<RegressionLine, TrendError> {
    if bars.len() < 2 {
        return Err(TrendError::NotEnoughBars(bars.len()));
    }
    bars.sort_by_key(|b| b.trade_date);

    let xs: Vec<f64> = (0..bars.len()).map(|i| i as f64).collect();
    let ys: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let slope = xs.iter().covariance(ys.iter()) / xs.iter().variance();
    let intercept = ys.iter().mean() - slope * xs.iter().mean();

    Ok(RegressionLine {
        slope,
        intercept,
        points: bars.len(),
    })
}

/// Text summary printed by the trend command
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub ts_code: String,
    pub first: DailyBar,
    pub last: DailyBar,
    pub highest: f64,
    pub lowest: f64,
    pub line: RegressionLine,
}

impl TrendReport {
    pub fn build(ts_code: &str, mut bars: Vec<DailyBar>) -> Result<Self, TrendError> {
        let line = fit_close_regression(&mut bars)?;
        let highest = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let (first, last) = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => return Err(TrendError::NotEnoughBars(bars.len())),
        };

        Ok(Self {
            ts_code: ts_code.to_string(),
            first,
            last,
            highest,
            lowest,
            line,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "{} daily candles {} to {} ({} bars)",
                self.ts_code,
                self.first.trade_date.format(TRADE_DATE_FORMAT),
                self.last.trade_date.format(TRADE_DATE_FORMAT),
                self.line.points
            ),
            format!(
                "First close: {:.2} | Last close: {:.2} | High: {:.2} | Low: {:.2}",
                self.first.close, self.last.close, self.highest, self.lowest
            ),
            format!(
                "Regression line: y = {:.4}x + {:.2}",
                self.line.slope, self.line.intercept
            ),
            format!("Slope: {:.4} (average daily price change)", self.line.slope),
            format!("Trend: {}", self.line.trend()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bar(day: u32, close: f64) -> DailyBar {
        DailyBar {
            trade_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn test_exact_line() {
        let mut bars: Vec<DailyBar> = (1..=10).map(|d| bar(d, 2.0 * (d - 1) as f64 + 5.0)).collect();
        let line = fit_close_regression(&mut bars).unwrap();
        assert_relative_eq!(line.slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(line.intercept, 5.0, epsilon = 1e-9);
        assert_eq!(line.trend(), Trend::Rising);
    }

    #[test]
    fn test_unsorted_input_sorted_by_date() {
        let mut bars = vec![bar(3, 8.0), bar(1, 10.0), bar(2, 9.0)];
        let line = fit_close_regression(&mut bars).unwrap();
        assert_eq!(bars[0].trade_date.format(TRADE_DATE_FORMAT).to_string(), "20240301");
        assert_relative_eq!(line.slope, -1.0, epsilon = 1e-9);
        assert_relative_eq!(line.value_at(0.0), 10.0, epsilon = 1e-9);
        assert_eq!(line.trend(), Trend::Falling);
    }

    #[test]
    fn test_flat() {
        let mut bars = vec![bar(1, 4.0), bar(2, 4.0), bar(3, 4.0)];
        assert_eq!(fit_close_regression(&mut bars).unwrap().trend(), Trend::Flat);
    }

    #[test]
    fn test_needs_two_bars() {
        let mut one = vec![bar(1, 1.0)];
        assert_eq!(fit_close_regression(&mut one).unwrap_err(), TrendError::NotEnoughBars(1));
        assert!(TrendReport::build("600519.SH", vec![]).is_err());
    }

    #[test]
    fn test_report_lines() {
        let report = TrendReport::build("000001.SZ", vec![bar(2, 11.0), bar(1, 10.0)]).unwrap();
        let lines = report.lines();
        assert!(lines[0].starts_with("000001.SZ daily candles 20240301 to 20240302"));
        assert_eq!(lines[2], "Regression line: y = 1.0000x + 10.00");
        assert_eq!(report.highest, 12.0);
        assert_eq!(report.lowest, 9.0);
        assert_eq!(lines[4], "Trend: rising");
    }
}
