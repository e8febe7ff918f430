//! Rug Risk
//!
//! Typed rugcheck report and the risk score derived from it.
//! 0.0 = safe, 1.0 = rugged.

use serde::{Deserialize, Serialize};

/// Risk score used when the report carries no usable signal
pub const DEFAULT_RISK_SCORE: f64 = 0.5;

/// One entry of the report's `risks` list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskItem {
    pub name: String,
    pub value: String,
    pub description: String,
    pub score: f64,
    pub level: String,
}

/// Rugcheck token report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RugcheckReport {
    pub mint: String,
    /// Raw rugcheck score, higher means safer
    pub score: Option<f64>,
    /// Normalised score in [0, 1], higher means safer
    #[serde(rename = "score_normalised")]
    pub score_normalised: Option<f64>,
    pub rugged: bool,
    pub risks: Option<Vec<RiskItem>>,
    pub price: Option<f64>,
}

/// Normalize a report into a 0..=1 risk score
pub fn extract_risk_score(report: &RugcheckReport) -> f64 {
    if let Some(normalised) = report.score_normalised {
        return (1.0 - normalised).clamp(0.0, 1.0);
    }
    if let Some(score) = report.score {
        return (1.0 - score / 100.0).clamp(0.0, 1.0);
    }
    if report.rugged {
        return 1.0;
    }
    if let Some(risks) = &report.risks {
        return (risks.len() as f64 / 10.0).min(1.0);
    }
    DEFAULT_RISK_SCORE
}

/// Successful check of a single token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RugcheckSummary {
    pub risk_score: f64,
    pub is_rugged: bool,
    pub rugcheck_score: f64,
    pub normalized_score: f64,
    pub report: RugcheckReport,
}

impl RugcheckSummary {
    pub fn from_report(report: RugcheckReport) -> Self {
        Self {
            risk_score: extract_risk_score(&report),
            is_rugged: report.rugged,
            rugcheck_score: report.score.unwrap_or(0.0),
            normalized_score: report.score_normalised.unwrap_or(DEFAULT_RISK_SCORE),
            report,
        }
    }
}

/// Result of checking a token; a failed lookup is a value, not an error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RugcheckOutcome {
    Checked(RugcheckSummary),
    Failed { error: String },
}

impl RugcheckOutcome {
    pub fn risk_score(&self) -> Option<f64> {
        match self {
            RugcheckOutcome::Checked(summary) => Some(summary.risk_score),
            RugcheckOutcome::Failed { .. } => None,
        }
    }

    /// Checked with a risk score at or below `max_risk`
    pub fn is_safe(&self, max_risk: f64) -> bool {
        self.risk_score().is_some_and(|risk| risk <= max_risk)
    }
}
