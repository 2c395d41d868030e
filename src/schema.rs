use crate::error::{ForecastError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of the seasonality vector: one multiplier per calendar month.
pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkingCapitalDays {
    #[schemars(description = "Days sales outstanding: average days to collect receivables")]
    pub dso: f64,

    #[schemars(description = "Days payable outstanding: average days taken to pay suppliers")]
    pub dpo: f64,

    #[schemars(description = "Days inventory outstanding: average days inventory is held")]
    pub dio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CapexSchedule {
    #[schemars(description = "Recurring monthly capital expenditure in currency units")]
    pub monthly: f64,

    #[schemars(description = "Recurring quarterly capital expenditure in currency units")]
    pub quarterly: f64,

    #[schemars(description = "Recurring annual capital expenditure in currency units")]
    pub annual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DebtServiceTerms {
    #[schemars(description = "Annual interest rate on outstanding debt as a decimal (0.05 = 5%)")]
    pub interest_rate: f64,

    #[schemars(description = "Scheduled principal payment per period in currency units")]
    pub principal_payment: f64,
}

/// Immutable forecasting parameters.
///
/// An `AssumptionSet` is never modified after creation: scenario evaluation
/// and every other override path build a fresh value via
/// [`AssumptionDelta::apply`], leaving the original untouched. Each generated
/// forecast carries a snapshot of the exact set used, so results stay
/// reproducible after the caller's configuration moves on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssumptionSet {
    #[schemars(description = "Annual growth rate as a decimal. Negative values model shrinkage.")]
    pub growth_rate: f64,

    #[schemars(
        description = "Twelve multipliers, one per calendar month (index 0 = January), applied to the base projection. 1.0 means no seasonal effect."
    )]
    pub seasonality: Vec<f64>,

    #[schemars(description = "Working capital day assumptions")]
    pub working_capital: WorkingCapitalDays,

    #[schemars(description = "Capital expenditure cadence")]
    pub capex: CapexSchedule,

    #[schemars(description = "Debt service terms")]
    pub debt: DebtServiceTerms,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            growth_rate: 0.15,
            seasonality: vec![
                0.8, 0.9, 1.1, 1.2, 1.0, 0.9, 0.8, 0.9, 1.0, 1.1, 1.2, 1.0,
            ],
            working_capital: WorkingCapitalDays {
                dso: 30.0,
                dpo: 45.0,
                dio: 60.0,
            },
            capex: CapexSchedule {
                monthly: 10_000.0,
                quarterly: 50_000.0,
                annual: 200_000.0,
            },
            debt: DebtServiceTerms {
                interest_rate: 0.05,
                principal_payment: 5_000.0,
            },
        }
    }
}

impl AssumptionSet {
    /// Checks structural validity. Negative growth is allowed (it models a
    /// shrinking business); a malformed seasonality vector is not.
    pub fn validate(&self) -> Result<()> {
        if !self.growth_rate.is_finite() {
            return Err(ForecastError::InvalidGrowthRate(self.growth_rate));
        }
        validate_seasonality(&self.seasonality)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AssumptionSet)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

pub fn validate_seasonality(multipliers: &[f64]) -> Result<()> {
    if multipliers.len() != MONTHS_PER_YEAR {
        return Err(ForecastError::InvalidSeasonality(format!(
            "Expected {} multipliers, got {}",
            MONTHS_PER_YEAR,
            multipliers.len()
        )));
    }

    if multipliers.iter().any(|m| !m.is_finite() || *m < 0.0) {
        return Err(ForecastError::InvalidSeasonality(
            "All multipliers must be finite and non-negative".to_string(),
        ));
    }

    Ok(())
}

/// A partial override of assumption fields.
///
/// Only fields present in the delta replace the base value; everything else
/// carries over unchanged. Fields the schema does not know are collected
/// rather than rejected, so a stale caller cannot take down a scenario run --
/// each unknown key is surfaced as a warning on the scenario's outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AssumptionDelta {
    #[schemars(description = "Replacement annual growth rate")]
    pub growth_rate: Option<f64>,

    #[schemars(description = "Replacement 12-month seasonality multipliers")]
    pub seasonality: Option<Vec<f64>>,

    #[schemars(description = "Replacement working capital day assumptions")]
    pub working_capital: Option<WorkingCapitalDays>,

    #[schemars(description = "Replacement capital expenditure cadence")]
    pub capex: Option<CapexSchedule>,

    #[schemars(description = "Replacement debt service terms")]
    pub debt: Option<DebtServiceTerms>,

    #[serde(flatten)]
    #[schemars(skip)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl AssumptionDelta {
    /// Applies the delta to a base set, returning a new validated set plus one
    /// warning per unrecognized field. The base is never mutated.
    pub fn apply(&self, base: &AssumptionSet) -> Result<(AssumptionSet, Vec<String>)> {
        let mut next = base.clone();

        if let Some(growth_rate) = self.growth_rate {
            next.growth_rate = growth_rate;
        }
        if let Some(ref seasonality) = self.seasonality {
            next.seasonality = seasonality.clone();
        }
        if let Some(ref working_capital) = self.working_capital {
            next.working_capital = working_capital.clone();
        }
        if let Some(ref capex) = self.capex {
            next.capex = capex.clone();
        }
        if let Some(ref debt) = self.debt {
            next.debt = debt.clone();
        }

        next.validate()?;

        let warnings = self
            .unknown
            .keys()
            .map(|key| format!("Unknown assumption field '{}' ignored", key))
            .collect();

        Ok((next, warnings))
    }
}

/// A named what-if scenario: a label plus the assumption overrides to test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioSpec {
    #[schemars(description = "Unique scenario name, used as the key in the result map")]
    pub name: String,

    #[schemars(description = "Assumption fields to override for this scenario")]
    pub delta: AssumptionDelta,
}

impl ScenarioSpec {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ScenarioSpec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assumptions_are_valid() {
        let assumptions = AssumptionSet::default();
        assert!(assumptions.validate().is_ok());
        assert_eq!(assumptions.seasonality.len(), MONTHS_PER_YEAR);
        assert_eq!(assumptions.working_capital.dso, 30.0);
        assert_eq!(assumptions.debt.interest_rate, 0.05);
    }

    #[test]
    fn test_seasonality_length_is_enforced() {
        let mut assumptions = AssumptionSet::default();
        assumptions.seasonality = vec![1.0; 11];
        assert!(matches!(
            assumptions.validate(),
            Err(ForecastError::InvalidSeasonality(_))
        ));
    }

    #[test]
    fn test_seasonality_rejects_negative_and_non_finite() {
        let mut assumptions = AssumptionSet::default();
        assumptions.seasonality[3] = -0.2;
        assert!(assumptions.validate().is_err());

        assumptions.seasonality[3] = f64::NAN;
        assert!(assumptions.validate().is_err());
    }

    #[test]
    fn test_negative_growth_is_valid() {
        let assumptions = AssumptionSet {
            growth_rate: -0.25,
            ..AssumptionSet::default()
        };
        assert!(assumptions.validate().is_ok());
    }

    #[test]
    fn test_delta_overrides_only_named_fields() {
        let base = AssumptionSet::default();
        let delta = AssumptionDelta {
            growth_rate: Some(0.02),
            ..AssumptionDelta::default()
        };

        let (next, warnings) = delta.apply(&base).unwrap();
        assert_eq!(next.growth_rate, 0.02);
        assert_eq!(next.seasonality, base.seasonality);
        assert_eq!(next.capex, base.capex);
        assert!(warnings.is_empty());

        // The base stays as it was.
        assert_eq!(base.growth_rate, 0.15);
    }

    #[test]
    fn test_delta_surfaces_unknown_fields_as_warnings() {
        let json = r#"{"growth_rate": 0.1, "inflation_rate": 0.03}"#;
        let delta: AssumptionDelta = serde_json::from_str(json).unwrap();

        let (next, warnings) = delta.apply(&AssumptionSet::default()).unwrap();
        assert_eq!(next.growth_rate, 0.1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("inflation_rate"));
    }

    #[test]
    fn test_delta_with_bad_seasonality_fails() {
        let delta = AssumptionDelta {
            seasonality: Some(vec![1.0, 2.0]),
            ..AssumptionDelta::default()
        };
        assert!(delta.apply(&AssumptionSet::default()).is_err());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = AssumptionSet::schema_as_json().unwrap();
        assert!(schema_json.contains("growth_rate"));
        assert!(schema_json.contains("seasonality"));
        assert!(schema_json.contains("working_capital"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let assumptions = AssumptionSet::default();
        let json = serde_json::to_string_pretty(&assumptions).unwrap();
        let restored: AssumptionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, assumptions);
    }
}
