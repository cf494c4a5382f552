mod altitude;
pub(crate) mod elements;
mod error;
mod geodetic;
mod propagator;
pub(crate) mod trajectory;

pub use altitude::{AltitudeBand, BandFilter};
pub use elements::{period_from_mean_motion, ElementSummary, OrbitalElementSet};
pub use error::OrbitError;
pub use geodetic::{position_to_geodetic, to_geodetic, GeodeticPosition};
pub use propagator::{distance_km, Ephemeris, PropagationStatus, Propagator, StateVector};
pub use trajectory::{sample, step_count, Trajectory, TrajectoryPoint};

/// Mean Earth radius used for altitudes, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Earth gravitational parameter, km^3/s^2.
pub const MU_KM3_S2: f64 = 398_600.441_8;
