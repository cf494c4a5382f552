use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::orbit::{
    position_to_geodetic, AltitudeBand, Ephemeris, GeodeticPosition, OrbitError, StateVector,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrajectoryPoint {
    pub timestamp: DateTime<Utc>,
    pub state: StateVector,
    pub geodetic: GeodeticPosition,
    pub band: AltitudeBand,
}

impl TrajectoryPoint {
    pub fn from_state(state: StateVector) -> Result<Self, OrbitError> {
        let geodetic = position_to_geodetic(&state.position)?;
        Ok(Self {
            timestamp: state.timestamp,
            state,
            geodetic,
            band: AltitudeBand::classify(geodetic.altitude_km),
        })
    }
}

/// Chronological samples of one object over a number of orbital periods.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Trajectory {
    pub start: DateTime<Utc>,
    pub period_minutes: f64,
    pub step_minutes: f64,
    pub requested_steps: usize,
    pub dropped: usize,
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Number of samples [`sample`] takes: `floor(num_periods * period / step)`.
pub fn step_count(
    period_minutes: f64,
    num_periods: u32,
    step_minutes: f64,
) -> Result<usize, OrbitError> {
    if num_periods < 1 {
        return Err(OrbitError::InvalidParameter(
            "num_periods must be at least 1".into(),
        ));
    }
    if !(step_minutes > 0.0 && step_minutes.is_finite()) {
        return Err(OrbitError::InvalidParameter(format!(
            "step_minutes must be positive, got {}",
            step_minutes
        )));
    }
    let steps = (period_minutes * f64::from(num_periods) / step_minutes).floor();
    if !(steps >= 0.0 && steps < usize::MAX as f64) {
        return Err(OrbitError::InvalidParameter(format!(
            "{} periods at {} min per step is not a usable sample count",
            num_periods, step_minutes
        )));
    }
    Ok(steps as usize)
}

/// Instant of sample `index`, or an error once it leaves the representable range.
fn sample_instant(
    start: DateTime<Utc>,
    index: usize,
    step_minutes: f64,
) -> Result<DateTime<Utc>, OrbitError> {
    let offset_us = (index as f64 * step_minutes * 60_000_000.0).round();
    if offset_us >= i64::MAX as f64 {
        return Err(OrbitError::InvalidParameter(format!(
            "sample {} lies beyond the representable time range",
            index
        )));
    }
    start
        .checked_add_signed(Duration::microseconds(offset_us as i64))
        .ok_or_else(|| {
            OrbitError::InvalidParameter(format!(
                "sample {} lies beyond the representable time range",
                index
            ))
        })
}

/// Sample `num_periods` orbits starting at `start`, one point per step.
///
/// Samples that fail to propagate are dropped, so the result may be
/// shorter than the requested number of steps. Callers bound the step
/// count with [`step_count`] before sampling.
pub fn sample(
    ephemeris: &impl Ephemeris,
    start: DateTime<Utc>,
    num_periods: u32,
    step_minutes: f64,
) -> Result<Trajectory, OrbitError> {
    let period_minutes = ephemeris.period_minutes();
    let steps = step_count(period_minutes, num_periods, step_minutes)?;
    if steps > 0 {
        // Fail before propagating anything if the window runs off the calendar.
        sample_instant(start, steps - 1, step_minutes)?;
    }

    let mut points = Vec::new();
    let mut dropped = 0;

    for i in 0..steps {
        let timestamp = sample_instant(start, i, step_minutes)?;
        match ephemeris
            .state_at(timestamp)
            .and_then(TrajectoryPoint::from_state)
        {
            Ok(point) => points.push(point),
            Err(e) => {
                log::debug!("Dropping trajectory sample at {}: {}", timestamp, e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::warn!("{} of {} trajectory samples dropped", dropped, steps);
    }

    Ok(Trajectory {
        start,
        period_minutes,
        step_minutes,
        requested_steps: steps,
        dropped,
        points,
    })
}
