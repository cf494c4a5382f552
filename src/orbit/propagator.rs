use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sgp4::{Constants, MinutesSinceEpoch};
use utoipa::ToSchema;

use crate::orbit::{OrbitError, OrbitalElementSet, MU_KM3_S2};

/// SGP4 status code. Zero is nominal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PropagationStatus(pub u8);

impl PropagationStatus {
    pub const NOMINAL: Self = Self(0);
    pub const MEAN_ECCENTRICITY: Self = Self(1);
    pub const PERTURBED_ECCENTRICITY: Self = Self(3);
    pub const SEMI_LATUS_RECTUM: Self = Self(4);
    pub const EPOCH_OFFSET: Self = Self(7);

    pub fn is_nominal(self) -> bool {
        self == Self::NOMINAL
    }

    pub(crate) fn from_sgp4(err: &sgp4::Error) -> Self {
        match err {
            sgp4::Error::OutOfRangeEccentricity { .. } => Self::MEAN_ECCENTRICITY,
            sgp4::Error::OutOfRangePerturbedEccentricity { .. } => Self::PERTURBED_ECCENTRICITY,
            sgp4::Error::NegativeSemiLatusRectum { .. } => Self::SEMI_LATUS_RECTUM,
            #[allow(unreachable_patterns)]
            _ => Self::MEAN_ECCENTRICITY,
        }
    }
}

impl fmt::Display for PropagationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inertial (TEME) position and velocity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct StateVector {
    pub timestamp: DateTime<Utc>,
    /// km
    #[schema(value_type = Vec<f64>)]
    pub position: [f64; 3],
    /// km/s
    #[schema(value_type = Vec<f64>)]
    pub velocity: [f64; 3],
}

impl StateVector {
    pub fn radius_km(&self) -> f64 {
        norm(self.position)
    }

    pub fn speed_km_s(&self) -> f64 {
        norm(self.velocity)
    }

    /// v^2/2 - mu/r, in km^2/s^2.
    pub fn specific_orbital_energy(&self) -> f64 {
        let v = self.speed_km_s();
        v * v / 2.0 - MU_KM3_S2 / self.radius_km()
    }
}

pub fn distance_km(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Anything that yields an inertial state for an instant.
pub trait Ephemeris {
    fn state_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, OrbitError>;

    fn period_minutes(&self) -> f64;
}

/// SGP4 model built from one element set.
pub struct Propagator {
    epoch: DateTime<Utc>,
    period_minutes: f64,
    constants: Constants,
}

impl Propagator {
    pub fn new(elements: &OrbitalElementSet) -> Result<Self, OrbitError> {
        let constants = Constants::from_elements(elements.sgp4_elements())?;
        Ok(Self {
            epoch: elements.epoch(),
            period_minutes: elements.period_minutes(),
            constants,
        })
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn propagate(&self, timestamp: DateTime<Utc>) -> Result<StateVector, OrbitError> {
        let minutes = self.minutes_since_epoch(timestamp)?;
        let prediction = self.constants.propagate(MinutesSinceEpoch(minutes))?;
        Ok(StateVector {
            timestamp,
            position: prediction.position,
            velocity: prediction.velocity,
        })
    }

    /// Status-code form of [`Propagator::propagate`].
    pub fn propagate_with_status(
        &self,
        timestamp: DateTime<Utc>,
    ) -> (PropagationStatus, Option<StateVector>) {
        match self.propagate(timestamp) {
            Ok(state) => (PropagationStatus::NOMINAL, Some(state)),
            Err(OrbitError::PropagationFailure { status, .. }) => (status, None),
            // `propagate` only reports failures as PropagationFailure.
            Err(
                OrbitError::MalformedElementSet(_)
                | OrbitError::DegenerateRadius
                | OrbitError::InvalidParameter(_),
            ) => (PropagationStatus::EPOCH_OFFSET, None),
        }
    }

    fn minutes_since_epoch(&self, timestamp: DateTime<Utc>) -> Result<f64, OrbitError> {
        let offset = timestamp - self.epoch;
        offset
            .num_microseconds()
            .map(|us| us as f64 / 60_000_000.0)
            .ok_or_else(|| OrbitError::PropagationFailure {
                status: PropagationStatus::EPOCH_OFFSET,
                message: format!("{} is too far from epoch {}", timestamp, self.epoch),
            })
    }
}

impl Ephemeris for Propagator {
    fn state_at(&self, timestamp: DateTime<Utc>) -> Result<StateVector, OrbitError> {
        self.propagate(timestamp)
    }

    fn period_minutes(&self) -> f64 {
        self.period_minutes
    }
}
