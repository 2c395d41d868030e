use crate::error::Result;
use crate::noise::NoiseSource;
use crate::schema::AssumptionSet;
use crate::utils::{horizon_end, mean, weekly_date};
use crate::{CashFlowForecast, CashFlowProjection, DecompositionFactors};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::f64::consts::PI;

/// Base value used when the historical series is empty.
pub const DEFAULT_BASE_VALUE: f64 = 100_000.0;

/// Tag recorded on every forecast describing how it was produced.
pub const METHODOLOGY: &str = "ARIMA + Seasonal Decomposition";

const DEFAULT_VOLATILITY: f64 = 0.1;
const RANDOM_SPREAD: f64 = 0.1;
const CYCLE_LENGTH_WEEKS: usize = 48;
const BASE_CONFIDENCE: f64 = 0.9;
const CONFIDENCE_DECAY: f64 = 0.05;
const CONFIDENCE_FLOOR: f64 = 0.3;

/// Projects a historical cash series forward by decomposing each period into
/// trend, seasonal, cyclical, and random multipliers.
///
/// A `Forecaster` owns a validated [`AssumptionSet`] snapshot; building one
/// never mutates the caller's set. All randomness flows through the injected
/// [`NoiseSource`], so a fixed seed reproduces a forecast exactly.
pub struct Forecaster {
    assumptions: AssumptionSet,
    volatility: f64,
}

impl Forecaster {
    pub fn new(assumptions: AssumptionSet) -> Result<Self> {
        assumptions.validate()?;
        Ok(Self {
            assumptions,
            volatility: DEFAULT_VOLATILITY,
        })
    }

    /// Overrides the volatility parameter (default 0.1).
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    /// Generates a weekly-spaced forecast of `periods` periods starting at
    /// `start`.
    ///
    /// The base value is the last element of `historical` (or
    /// [`DEFAULT_BASE_VALUE`] for an empty series). `periods == 0` yields an
    /// empty forecast rather than an error.
    pub fn generate_forecast(
        &self,
        historical: &[f64],
        periods: usize,
        start: NaiveDate,
        noise: &mut dyn NoiseSource,
    ) -> CashFlowForecast {
        let base_value = historical.last().copied().unwrap_or(DEFAULT_BASE_VALUE);
        debug!(
            "Projecting {} periods from base value {:.2} (growth {:.4})",
            periods, base_value, self.assumptions.growth_rate
        );

        let mut projections = Vec::with_capacity(periods);
        for index in 0..periods {
            let date = weekly_date(start, index);

            let trend = self.trend_factor(index);
            let seasonal = self.seasonal_factor(date);
            let cyclical = cyclical_factor(index);
            let random = 1.0 + noise.next_unit() * RANDOM_SPREAD;
            let volatility = 1.0 + noise.next_unit() * self.volatility;

            let projected = base_value * trend * seasonal * cyclical * random * volatility;

            projections.push(CashFlowProjection {
                date,
                projected,
                actual: None,
                confidence: confidence_at(index),
                factors: DecompositionFactors {
                    seasonal,
                    trend,
                    cyclical,
                    random,
                },
            });
        }

        let confidences: Vec<f64> = projections.iter().map(|p| p.confidence).collect();

        CashFlowForecast {
            period_start: start,
            period_end: horizon_end(start, periods),
            projections,
            overall_confidence: mean(&confidences),
            methodology: METHODOLOGY.to_string(),
            assumptions: self.assumptions.clone(),
        }
    }

    /// Compound growth on a quarterly cadence: `(1 + g)^(i/4)`.
    fn trend_factor(&self, index: usize) -> f64 {
        (1.0 + self.assumptions.growth_rate).powf(index as f64 / 4.0)
    }

    /// Calendar-month multiplier, 1.0 when the vector does not cover the month.
    fn seasonal_factor(&self, date: NaiveDate) -> f64 {
        self.assumptions
            .seasonality
            .get(date.month0() as usize)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Sinusoidal multiplier over a fixed 48-week business cycle.
fn cyclical_factor(index: usize) -> f64 {
    let position = (index % CYCLE_LENGTH_WEEKS) as f64 / CYCLE_LENGTH_WEEKS as f64;
    1.0 + 0.1 * (2.0 * PI * position).sin()
}

/// Confidence decays linearly with the horizon and never drops below 0.3.
fn confidence_at(index: usize) -> f64 {
    (BASE_CONFIDENCE - CONFIDENCE_DECAY * index as f64).max(CONFIDENCE_FLOOR)
}
