//! Projected-vs-actual variance reconciliation.
//!
//! Driver attribution here is a heuristic decomposition, not a causal proof:
//! each materially-sized factor is priced independently against the projected
//! value, and whatever the named drivers fail to cover lands in an
//! "Unexplained" bucket when it is large enough to matter.

use crate::{CashFlowForecast, CashFlowProjection};
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One row from the actuals feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActualCashPoint {
    #[schemars(description = "Realized cash flow date; must equal a projection date exactly to match")]
    pub date: NaiveDate,

    #[schemars(description = "Realized cash amount in currency units")]
    pub amount: f64,
}

/// A named, quantified contributor to a projected-vs-actual gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceDriver {
    pub factor: String,
    /// Contribution in currency units.
    pub impact: f64,
    pub explanation: String,
}

/// Reconciliation of one matched period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRecord {
    pub period: NaiveDate,
    pub projected: f64,
    pub actual: f64,
    /// `actual - projected`, in currency units.
    pub variance: f64,
    /// `variance / projected * 100`. `None` when `projected` is zero: the
    /// ratio is undefined there, never infinity and never an error.
    pub variance_percent: Option<f64>,
    pub drivers: Vec<VarianceDriver>,
}

const SEASONAL_THRESHOLD: f64 = 0.1;
const CYCLICAL_THRESHOLD: f64 = 0.1;
const TREND_THRESHOLD: f64 = 0.05;
const UNEXPLAINED_FLOOR: f64 = 1_000.0;

pub struct VarianceAnalyzer;

impl VarianceAnalyzer {
    /// Matches projections against actuals by exact date and reconciles each
    /// matched period's gap into drivers. Unmatched periods (on either side)
    /// produce no record. When one date appears more than once in the actuals
    /// feed, the first occurrence wins.
    pub fn analyze(
        forecast: &CashFlowForecast,
        actuals: &[ActualCashPoint],
    ) -> Vec<VarianceRecord> {
        let mut records = Vec::new();

        for projection in &forecast.projections {
            let Some(actual) = actuals.iter().find(|a| a.date == projection.date) else {
                continue;
            };

            let variance = actual.amount - projection.projected;
            let variance_percent = if projection.projected != 0.0 {
                Some(variance / projection.projected * 100.0)
            } else {
                debug!(
                    "Projected value for {} is zero; variance percent is undefined",
                    projection.date
                );
                None
            };

            records.push(VarianceRecord {
                period: projection.date,
                projected: projection.projected,
                actual: actual.amount,
                variance,
                variance_percent,
                drivers: identify_drivers(projection, variance),
            });
        }

        records
    }
}

fn identify_drivers(projection: &CashFlowProjection, variance: f64) -> Vec<VarianceDriver> {
    let mut drivers = Vec::new();
    let projected = projection.projected;
    let factors = &projection.factors;

    if (factors.seasonal - 1.0).abs() > SEASONAL_THRESHOLD {
        drivers.push(VarianceDriver {
            factor: "Seasonality".to_string(),
            impact: (factors.seasonal - 1.0) * projected,
            explanation: format!("Seasonal factor was {:.2}x", factors.seasonal),
        });
    }

    if (factors.trend - 1.0).abs() > TREND_THRESHOLD {
        drivers.push(VarianceDriver {
            factor: "Growth Trend".to_string(),
            impact: (factors.trend - 1.0) * projected,
            explanation: format!("Growth trend was {:.2}x", factors.trend),
        });
    }

    if (factors.cyclical - 1.0).abs() > CYCLICAL_THRESHOLD {
        drivers.push(VarianceDriver {
            factor: "Business Cycle".to_string(),
            impact: (factors.cyclical - 1.0) * projected,
            explanation: format!("Cyclical factor was {:.2}x", factors.cyclical),
        });
    }

    let explained: f64 = drivers.iter().map(|d| d.impact).sum();
    let unexplained = variance - explained;

    if unexplained.abs() > UNEXPLAINED_FLOOR {
        drivers.push(VarianceDriver {
            factor: "Unexplained".to_string(),
            impact: unexplained,
            explanation: "Random factors or model limitations".to_string(),
        });
    }

    drivers
}
