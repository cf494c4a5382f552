use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::orbit::OrbitError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error("search window is empty: {start} .. {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("search step must be positive")]
    InvalidStep,
    #[error("minimum elevation {0} is outside -90..=90 degrees")]
    InvalidElevation(f64),
}
