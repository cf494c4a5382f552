use serde::Serialize;
use utoipa::ToSchema;

use crate::orbit::{OrbitError, EARTH_RADIUS_KM};

/// Sub-satellite point on a spherical Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// km above the mean Earth radius
    pub altitude_km: f64,
}

/// Inertial cartesian position (km) to latitude/longitude/altitude.
///
/// Uses a 6371 km sphere and ignores Earth rotation, so longitude is the
/// right ascension of the position vector.
pub fn to_geodetic(x: f64, y: f64, z: f64) -> Result<GeodeticPosition, OrbitError> {
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 || !r.is_finite() {
        return Err(OrbitError::DegenerateRadius);
    }

    let latitude_deg = (z / r).clamp(-1.0, 1.0).asin().to_degrees();
    let mut longitude_deg = y.atan2(x).to_degrees();
    if longitude_deg <= -180.0 {
        longitude_deg += 360.0;
    }

    Ok(GeodeticPosition {
        latitude_deg,
        longitude_deg,
        altitude_km: r - EARTH_RADIUS_KM,
    })
}

pub fn position_to_geodetic(position: &[f64; 3]) -> Result<GeodeticPosition, OrbitError> {
    to_geodetic(position[0], position[1], position[2])
}
