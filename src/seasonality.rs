use crate::error::Result;
use crate::schema::validate_seasonality;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Named generators for the 12-month seasonality multiplier vector.
///
/// Unlike allocation weights, these are multipliers applied around a base
/// projection, so a "no seasonality" profile is all 1.0 rather than 1/12.
/// Built-in profiles average to 1.0 across the year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum SeasonalityProfile {
    #[schemars(
        description = "General business curve: soft start to the year, spring and autumn peaks. The library default."
    )]
    Baseline,

    #[schemars(description = "No seasonal effect: every month multiplies by 1.0.")]
    Flat,

    #[schemars(
        description = "Retail pattern: subdued most of the year with a November/December peak."
    )]
    RetailPeak,

    #[schemars(
        description = "Summer tourism pattern: high May-August, quiet winter months."
    )]
    SummerHigh,

    #[schemars(
        description = "Custom 12-value array of monthly multipliers (index 0 = January). Values must be finite and non-negative."
    )]
    Custom(Vec<f64>),
}

impl SeasonalityProfile {
    /// The 12 calendar-month multipliers for this profile.
    pub fn multipliers(&self) -> Result<Vec<f64>> {
        let multipliers = match self {
            SeasonalityProfile::Baseline => vec![
                0.8, 0.9, 1.1, 1.2, 1.0, 0.9, 0.8, 0.9, 1.0, 1.1, 1.2, 1.0,
            ],

            SeasonalityProfile::Flat => vec![1.0; 12],

            SeasonalityProfile::RetailPeak => vec![
                0.85, 0.85, 0.9, 0.9, 0.95, 0.95, 1.0, 1.0, 1.05, 1.05, 1.2, 1.3,
            ],

            SeasonalityProfile::SummerHigh => vec![
                0.8, 0.8, 0.9, 1.1, 1.2, 1.3, 1.3, 1.2, 1.0, 0.9, 0.8, 0.7,
            ],

            SeasonalityProfile::Custom(custom) => {
                validate_seasonality(custom)?;
                custom.clone()
            }
        };

        Ok(multipliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mean_is_one(multipliers: &[f64]) {
        let mean: f64 = multipliers.iter().sum::<f64>() / multipliers.len() as f64;
        assert!(
            (mean - 1.0).abs() < 1e-10,
            "profile should average to 1.0, got {}",
            mean
        );
    }

    #[test]
    fn test_baseline_matches_default_assumptions() {
        let multipliers = SeasonalityProfile::Baseline.multipliers().unwrap();
        assert_eq!(
            multipliers,
            crate::schema::AssumptionSet::default().seasonality
        );
    }

    #[test]
    fn test_flat_profile() {
        let multipliers = SeasonalityProfile::Flat.multipliers().unwrap();
        assert_eq!(multipliers, vec![1.0; 12]);
    }

    #[test]
    fn test_built_in_profiles_average_to_one() {
        for profile in [
            SeasonalityProfile::Baseline,
            SeasonalityProfile::Flat,
            SeasonalityProfile::RetailPeak,
            SeasonalityProfile::SummerHigh,
        ] {
            let multipliers = profile.multipliers().unwrap();
            assert_eq!(multipliers.len(), 12);
            assert_mean_is_one(&multipliers);
        }
    }

    #[test]
    fn test_retail_peaks_in_december() {
        let multipliers = SeasonalityProfile::RetailPeak.multipliers().unwrap();
        let december = multipliers[11];
        assert!(multipliers.iter().all(|m| *m <= december));
    }

    #[test]
    fn test_custom_valid() {
        let custom = vec![0.9, 0.9, 0.9, 1.0, 1.0, 1.0, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0];
        let multipliers = SeasonalityProfile::Custom(custom.clone())
            .multipliers()
            .unwrap();
        assert_eq!(multipliers, custom);
    }

    #[test]
    fn test_custom_invalid_length() {
        let result = SeasonalityProfile::Custom(vec![1.0, 1.0]).multipliers();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_rejects_negative() {
        let mut custom = vec![1.0; 12];
        custom[5] = -1.0;
        assert!(SeasonalityProfile::Custom(custom).multipliers().is_err());
    }
}
