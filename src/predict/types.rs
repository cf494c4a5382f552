use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A visibility pass over a ground station.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PassWindow {
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub peak_time: DateTime<Utc>,
    pub peak_elevation_deg: f64,
    pub peak_azimuth_deg: f64,
    pub duration_minutes: f64,
    /// AOS or LOS is a search window edge rather than a horizon crossing.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Rise,
    Set,
}

/// Instant where the visibility predicate changes value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Crossing {
    pub time: DateTime<Utc>,
    pub transition: Transition,
}

/// What to do with passes cut by the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WindowEdges {
    /// Drop a pass already in progress at the start and one still in
    /// progress at the end.
    #[default]
    Discard,
    /// Report such passes with the window edge as AOS or LOS.
    Clip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PassSearch {
    pub min_elevation_deg: f64,
    #[serde(default)]
    pub edges: WindowEdges,
}

impl Default for PassSearch {
    fn default() -> Self {
        Self {
            min_elevation_deg: 10.0,
            edges: WindowEdges::Discard,
        }
    }
}
