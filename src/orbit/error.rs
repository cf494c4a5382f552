use thiserror::Error;

use crate::orbit::PropagationStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrbitError {
    #[error("malformed element set: {0}")]
    MalformedElementSet(String),
    #[error("propagation failed (status {status}): {message}")]
    PropagationFailure {
        status: PropagationStatus,
        message: String,
    },
    #[error("position has zero or non-finite distance from Earth's centre")]
    DegenerateRadius,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<sgp4::TleError> for OrbitError {
    fn from(err: sgp4::TleError) -> Self {
        OrbitError::MalformedElementSet(err.to_string())
    }
}

impl From<sgp4::ElementsError> for OrbitError {
    fn from(err: sgp4::ElementsError) -> Self {
        OrbitError::MalformedElementSet(err.to_string())
    }
}

impl From<sgp4::Error> for OrbitError {
    fn from(err: sgp4::Error) -> Self {
        OrbitError::PropagationFailure {
            status: PropagationStatus::from_sgp4(&err),
            message: err.to_string(),
        }
    }
}
