use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::debris::{DebrisCatalog, DebrisRecord};
use crate::orbit::{distance_km, OrbitError, TrajectoryPoint};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CollisionEvent {
    pub timestamp: DateTime<Utc>,
    pub distance_km: f64,
    pub trajectory_point: TrajectoryPoint,
    pub debris: DebrisRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClosestApproach {
    pub distance_km: f64,
    pub trajectory_point: TrajectoryPoint,
    pub debris: DebrisRecord,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProximityResult {
    pub threshold_km: f64,
    /// `+inf` when either input was empty; serialized as null.
    pub min_distance_km: f64,
    pub closest: Option<ClosestApproach>,
    pub collision: bool,
    pub collision_count: usize,
    pub events: Vec<CollisionEvent>,
}

impl ProximityResult {
    /// Safety margin to the threshold, absent when nothing was compared.
    pub fn margin_km(&self) -> Option<f64> {
        self.closest
            .as_ref()
            .map(|c| c.distance_km - self.threshold_km)
    }
}

/// Compare every trajectory point with every catalog record.
///
/// Points are visited chronologically and records in catalog order; the
/// first pair reaching the minimum is kept and events come out in that
/// same order.
pub fn analyze(
    trajectory: &[TrajectoryPoint],
    catalog: &DebrisCatalog,
    threshold_km: f64,
) -> Result<ProximityResult, OrbitError> {
    if !(threshold_km > 0.0 && threshold_km.is_finite()) {
        return Err(OrbitError::InvalidParameter(format!(
            "threshold_km must be positive, got {}",
            threshold_km
        )));
    }

    let mut min_distance_km = f64::INFINITY;
    let mut closest: Option<(&TrajectoryPoint, &DebrisRecord)> = None;
    let mut events = Vec::new();

    for point in trajectory {
        for debris in catalog.records() {
            let distance = distance_km(&point.state.position, &debris.state.position);

            if distance < min_distance_km {
                min_distance_km = distance;
                closest = Some((point, debris));
            }

            if distance < threshold_km {
                events.push(CollisionEvent {
                    timestamp: point.timestamp,
                    distance_km: distance,
                    trajectory_point: point.clone(),
                    debris: debris.clone(),
                });
            }
        }
    }

    log::info!(
        "Compared {} trajectory points against {} debris: {} within {} km",
        trajectory.len(),
        catalog.len(),
        events.len(),
        threshold_km
    );

    Ok(ProximityResult {
        threshold_km,
        min_distance_km,
        closest: closest.map(|(point, debris)| ClosestApproach {
            distance_km: min_distance_km,
            trajectory_point: point.clone(),
            debris: debris.clone(),
        }),
        collision: !events.is_empty(),
        collision_count: events.len(),
        events,
    })
}
