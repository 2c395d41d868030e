use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Invalid seasonality vector: {0}")]
    InvalidSeasonality(String),

    #[error("Invalid growth rate {0}: must be a finite number")]
    InvalidGrowthRate(f64),

    #[error("Operation cancelled before completion")]
    Cancelled,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
