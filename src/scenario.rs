//! What-if scenario evaluation.
//!
//! Each scenario overlays its assumption delta on the base forecast's
//! snapshot and replays the base projections as history through a fresh
//! [`Forecaster`]. Scenarios are mutually independent: they share nothing,
//! run in parallel, and draw from noise substreams keyed by scenario name so
//! the result for a given name does not depend on evaluation order.

use crate::cancel::CancelToken;
use crate::error::{ForecastError, Result};
use crate::forecaster::Forecaster;
use crate::noise::NoiseSource;
use crate::schema::ScenarioSpec;
use crate::CashFlowForecast;
use log::{debug, info};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Result of one scenario. A failed scenario reports under its own key and
/// never aborts its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Completed {
        forecast: CashFlowForecast,
        #[serde(default)]
        warnings: Vec<String>,
    },
    Failed {
        error: String,
    },
}

impl ScenarioOutcome {
    pub fn forecast(&self) -> Option<&CashFlowForecast> {
        match self {
            ScenarioOutcome::Completed { forecast, .. } => Some(forecast),
            ScenarioOutcome::Failed { .. } => None,
        }
    }
}

pub struct ScenarioEngine {
    volatility: Option<f64>,
}

impl ScenarioEngine {
    pub fn new() -> Self {
        Self { volatility: None }
    }

    /// Overrides the volatility passed to each scenario's forecaster.
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Evaluates every scenario against `base`, returning one outcome per
    /// scenario name. When two scenarios share a name, the later entry wins.
    /// Cancellation aborts the whole evaluation with `Cancelled`; everything
    /// partial is discarded.
    pub fn evaluate(
        &self,
        base: &CashFlowForecast,
        scenarios: &[ScenarioSpec],
        noise: &dyn NoiseSource,
        cancel: &CancelToken,
    ) -> Result<BTreeMap<String, ScenarioOutcome>> {
        info!(
            "Evaluating {} scenarios over a {}-period base forecast",
            scenarios.len(),
            base.projections.len()
        );

        // The counterfactual replays the base's own projections as history.
        let history: Vec<f64> = base.projections.iter().map(|p| p.projected).collect();

        let outcomes: Vec<(String, ScenarioOutcome)> = scenarios
            .par_iter()
            .map(|scenario| {
                if cancel.is_cancelled() {
                    return Err(ForecastError::Cancelled);
                }
                let outcome = self.evaluate_one(base, &history, scenario, noise);
                Ok((scenario.name.clone(), outcome))
            })
            .collect::<Result<_>>()?;

        Ok(outcomes.into_iter().collect())
    }

    fn evaluate_one(
        &self,
        base: &CashFlowForecast,
        history: &[f64],
        scenario: &ScenarioSpec,
        noise: &dyn NoiseSource,
    ) -> ScenarioOutcome {
        let (assumptions, warnings) = match scenario.delta.apply(&base.assumptions) {
            Ok(applied) => applied,
            Err(error) => {
                debug!("Scenario '{}' failed: {}", scenario.name, error);
                return ScenarioOutcome::Failed {
                    error: error.to_string(),
                };
            }
        };

        for warning in &warnings {
            debug!("Scenario '{}': {}", scenario.name, warning);
        }

        let forecaster = match Forecaster::new(assumptions) {
            Ok(forecaster) => match self.volatility {
                Some(volatility) => forecaster.with_volatility(volatility),
                None => forecaster,
            },
            Err(error) => {
                return ScenarioOutcome::Failed {
                    error: error.to_string(),
                }
            }
        };

        let mut noise = noise.fork(scenario_stream(&scenario.name));
        let forecast = forecaster.generate_forecast(
            history,
            base.projections.len(),
            base.period_start,
            noise.as_mut(),
        );

        ScenarioOutcome::Completed { forecast, warnings }
    }
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable per-name stream id, so evaluation order cannot change a scenario's
/// draws.
fn scenario_stream(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}
