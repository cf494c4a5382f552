use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::orbit::Ephemeris;
use crate::predict::{GroundStation, PredictError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// A continuous elevation signal seen from one place.
pub trait ElevationSource {
    fn look_angles(&self, timestamp: DateTime<Utc>) -> Result<LookAngles, PredictError>;

    /// Orbital period driving the search granularity.
    fn period_minutes(&self) -> f64;
}

/// An orbiting object as seen by a ground station.
pub struct Topocentric<'a, E> {
    ephemeris: &'a E,
    station: GroundStation,
}

impl<'a, E: Ephemeris> Topocentric<'a, E> {
    pub fn new(ephemeris: &'a E, station: GroundStation) -> Self {
        Self { ephemeris, station }
    }
}

impl<E: Ephemeris> ElevationSource for Topocentric<'_, E> {
    fn look_angles(&self, timestamp: DateTime<Utc>) -> Result<LookAngles, PredictError> {
        let state = self.ephemeris.state_at(timestamp)?;

        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
            &timestamp.naive_utc(),
        ));
        let sat_ecef = teme_to_ecef_position(state.position, sidereal);
        let sta_ecef = self.station.position_ecef_km();

        let dr = [
            sat_ecef[0] - sta_ecef[0],
            sat_ecef[1] - sta_ecef[1],
            sat_ecef[2] - sta_ecef[2],
        ];
        let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

        let (east, north, up) = ecef_to_enu(dr, self.station.lat_rad(), self.station.lon_rad());
        let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
        let elevation_deg = if range_km > 0.0 {
            (up / range_km).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            90.0
        };

        Ok(LookAngles {
            timestamp,
            azimuth_deg,
            elevation_deg,
            range_km,
        })
    }

    fn period_minutes(&self) -> f64 {
        self.ephemeris.period_minutes()
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zenith_is_straight_up() {
        let (east, north, up) = ecef_to_enu([500.0, 0.0, 0.0], 0.0, 0.0);
        assert!(east.abs() < 1e-9 && north.abs() < 1e-9);
        assert!((up - 500.0).abs() < 1e-9);
    }

    #[test]
    fn north_and_east_axes_at_equator() {
        let (_, north, _) = ecef_to_enu([0.0, 0.0, 100.0], 0.0, 0.0);
        assert!((north - 100.0).abs() < 1e-9);
        let (east, _, _) = ecef_to_enu([0.0, 100.0, 0.0], 0.0, 0.0);
        assert!((east - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sidereal_rotation_preserves_radius() {
        let p = teme_to_ecef_position([6771.0, 100.0, 50.0], 1.234);
        let r0 = (6771.0f64.powi(2) + 100.0f64.powi(2) + 50.0f64.powi(2)).sqrt();
        let r1 = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!((r0 - r1).abs() < 1e-9);
        assert_eq!(p[2], 50.0);
    }
}
