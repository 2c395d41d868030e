//! # Cash Flow Forecaster
//!
//! A library for decomposition-based cash flow forecasting: it projects a
//! historical cash series forward, reconciles projections against realized
//! actuals, evaluates what-if assumption changes, and quantifies risk with
//! Monte Carlo percentile bands.
//!
//! ## Core Concepts
//!
//! - **Decomposition**: each projected period is the product of trend,
//!   seasonal, cyclical, and random multipliers over a base value
//! - **Confidence decay**: per-period confidence shrinks with the horizon
//!   (0.9 down to a 0.3 floor) and drives Monte Carlo spread
//! - **Assumption snapshots**: every forecast carries the exact immutable
//!   [`AssumptionSet`] that produced it; overrides always build a new set
//! - **Injected randomness**: all stochastic paths draw through a seedable
//!   [`NoiseSource`], so results are reproducible bit for bit
//!
//! ## Example
//!
//! ```rust,ignore
//! use cash_flow_forecaster::*;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history = vec![92_000.0, 97_500.0, 101_250.0];
//!
//! let forecast = generate_forecast(&history, 13, AssumptionSet::default(), start, 42)?;
//!
//! let cancel = CancelToken::new();
//! let risk = run_simulation(&forecast, 1_000, 42, &cancel)?;
//! let downside = &risk.percentiles["5th"];
//! ```
//!
//! All operations are pure functions over their explicit inputs; nothing is
//! persisted and no state survives a call.

pub mod cancel;
pub mod error;
pub mod forecaster;
pub mod monte_carlo;
pub mod noise;
pub mod scenario;
pub mod schema;
pub mod seasonality;
pub mod utils;
pub mod variance;

pub use cancel::CancelToken;
pub use error::{ForecastError, Result};
pub use forecaster::{Forecaster, DEFAULT_BASE_VALUE, METHODOLOGY};
pub use monte_carlo::{MonteCarloResult, MonteCarloSimulator};
pub use noise::{MidpointNoise, NoiseSource, SeededNoise};
pub use scenario::{ScenarioEngine, ScenarioOutcome};
pub use schema::{
    AssumptionDelta, AssumptionSet, CapexSchedule, DebtServiceTerms, ScenarioSpec,
    WorkingCapitalDays,
};
pub use seasonality::SeasonalityProfile;
pub use variance::{ActualCashPoint, VarianceAnalyzer, VarianceDriver, VarianceRecord};

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The multipliers combined into one projected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionFactors {
    pub seasonal: f64,
    pub trend: f64,
    pub cyclical: f64,
    pub random: f64,
}

/// One projected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub date: NaiveDate,
    pub projected: f64,
    /// Realized amount, once known. The forecaster leaves this unset.
    pub actual: Option<f64>,
    /// In `[0.3, 0.9]`, non-increasing with the horizon.
    pub confidence: f64,
    pub factors: DecompositionFactors,
}

/// A dated sequence of weekly projections plus the assumptions that made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowForecast {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub projections: Vec<CashFlowProjection>,
    /// Mean of the per-projection confidences (0.0 for an empty forecast).
    pub overall_confidence: f64,
    pub methodology: String,
    /// Snapshot of the exact set used, kept for reproducibility.
    pub assumptions: AssumptionSet,
}

/// Generates a seeded forecast. Convenience wrapper over [`Forecaster`].
pub fn generate_forecast(
    historical: &[f64],
    periods: usize,
    assumptions: AssumptionSet,
    start: NaiveDate,
    seed: u64,
) -> Result<CashFlowForecast> {
    info!(
        "Generating {}-period forecast from {} historical points",
        periods,
        historical.len()
    );
    let forecaster = Forecaster::new(assumptions)?;
    let mut noise = SeededNoise::new(seed);
    Ok(forecaster.generate_forecast(historical, periods, start, &mut noise))
}

/// Reconciles a forecast against realized actuals.
pub fn analyze_variance(
    forecast: &CashFlowForecast,
    actuals: &[ActualCashPoint],
) -> Vec<VarianceRecord> {
    info!(
        "Analyzing variance for {} projections against {} actuals",
        forecast.projections.len(),
        actuals.len()
    );
    VarianceAnalyzer::analyze(forecast, actuals)
}

/// Evaluates named what-if scenarios against a base forecast.
pub fn evaluate_scenarios(
    base: &CashFlowForecast,
    scenarios: &[ScenarioSpec],
    seed: u64,
    cancel: &CancelToken,
) -> Result<BTreeMap<String, ScenarioOutcome>> {
    let noise = SeededNoise::new(seed);
    ScenarioEngine::new().evaluate(base, scenarios, &noise, cancel)
}

/// Runs a seeded Monte Carlo simulation over a base forecast.
pub fn run_simulation(
    base: &CashFlowForecast,
    iterations: usize,
    seed: u64,
    cancel: &CancelToken,
) -> Result<MonteCarloResult> {
    let noise = SeededNoise::new(seed);
    MonteCarloSimulator::new().simulate(base, iterations, &noise, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_end_to_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let history = vec![80_000.0, 90_000.0, 100_000.0];

        let forecast =
            generate_forecast(&history, 13, AssumptionSet::default(), start, 42).unwrap();
        assert_eq!(forecast.projections.len(), 13);
        assert_eq!(forecast.methodology, METHODOLOGY);
        assert_eq!(forecast.assumptions, AssumptionSet::default());

        let actuals = vec![ActualCashPoint {
            date: forecast.projections[0].date,
            amount: forecast.projections[0].projected * 1.1,
        }];
        let records = analyze_variance(&forecast, &actuals);
        assert_eq!(records.len(), 1);

        let cancel = CancelToken::new();
        let scenarios = vec![ScenarioSpec {
            name: "downside".to_string(),
            delta: AssumptionDelta {
                growth_rate: Some(-0.05),
                ..AssumptionDelta::default()
            },
        }];
        let outcomes = evaluate_scenarios(&forecast, &scenarios, 42, &cancel).unwrap();
        assert!(outcomes["downside"].forecast().is_some());

        let risk = run_simulation(&forecast, 200, 42, &cancel).unwrap();
        assert_eq!(risk.raw_scenarios.len(), 200);
    }

    #[test]
    fn test_forecast_serialization_round_trip() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let forecast =
            generate_forecast(&[50_000.0], 4, AssumptionSet::default(), start, 7).unwrap();

        let json = serde_json::to_string(&forecast).unwrap();
        let restored: CashFlowForecast = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, forecast);
    }
}
