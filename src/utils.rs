use chrono::{Days, NaiveDate};

/// Date of the projection period `index` periods after `start`.
/// Periods are weekly, so this is simply `start + 7 * index` days.
pub fn weekly_date(start: NaiveDate, index: usize) -> NaiveDate {
    start + Days::new(7 * index as u64)
}

/// End of a forecast horizon of `periods` weekly periods beginning at `start`.
pub fn horizon_end(start: NaiveDate, periods: usize) -> NaiveDate {
    weekly_date(start, periods)
}

/// Arithmetic mean. Returns 0.0 for an empty slice rather than NaN so that
/// an empty forecast carries a well-defined overall confidence.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
