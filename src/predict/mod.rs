mod discrete;
mod error;
mod ground_station;
mod look_angles;
mod pass_finder;
mod types;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use look_angles::{ElevationSource, LookAngles, Topocentric};
pub use pass_finder::{find_passes, predict_passes};
pub use types::{Crossing, PassSearch, PassWindow, Transition, WindowEdges};
