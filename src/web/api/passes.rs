use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{predict_passes, GroundStation, PassSearch, PassWindow, WindowEdges};
use crate::web::api::element_set;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

fn default_tle_name() -> String {
    "SATELLITE".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PassRequest {
    #[serde(default = "default_tle_name")]
    pub tle_name: String,
    pub tle_line1: String,
    pub tle_line2: String,
    /// Defaults to the configured station, as do `longitude` and `elevation`.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Observer elevation, m.
    pub elevation: Option<f64>,
    pub min_elevation: Option<f64>,
    /// Defaults to now.
    pub start: Option<DateTime<Utc>>,
    /// Hours.
    pub search_duration: Option<f64>,
    #[serde(default)]
    pub edges: WindowEdges,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassResponse {
    pub success: bool,
    pub satellite: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub passes: Vec<PassWindow>,
    pub count: usize,
}

/// Observer for a request, filling unset fields from the configured station.
fn observer(request: &PassRequest, station: GroundStation) -> ApiResult<GroundStation> {
    let latitude = request.latitude.unwrap_or(station.latitude_deg);
    let longitude = request.longitude.unwrap_or(station.longitude_deg);
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=360.0).contains(&longitude) {
        return Err(ApiError::Validation(format!(
            "observer position {}, {} is out of range",
            latitude, longitude
        )));
    }
    Ok(GroundStation::new(
        latitude,
        longitude,
        request.elevation.unwrap_or(station.altitude_m),
    ))
}

#[utoipa::path(
    post,
    path = "/api/calculate-passes",
    tag = "passes",
    request_body = PassRequest,
    responses(
        (status = 200, description = "Visibility passes in the search window", body = PassResponse),
        (status = 400, description = "Malformed element set or search parameters", body = ErrorResponse),
        (status = 422, description = "Propagation failed during the search", body = ErrorResponse)
    )
)]
pub async fn calculate_passes(
    State(state): State<AppState>,
    Json(request): Json<PassRequest>,
) -> ApiResult<Json<PassResponse>> {
    let elements = element_set(
        Some(&request.tle_name),
        &request.tle_line1,
        &request.tle_line2,
    )?;

    let station = observer(&request, state.station)?;

    let defaults = &state.config.analysis;
    let hours = request.search_duration.unwrap_or(defaults.search_hours);
    if !(hours > 0.0 && hours <= defaults.max_search_hours) {
        return Err(ApiError::Validation(format!(
            "search_duration must be in (0, {}] hours, got {}",
            defaults.max_search_hours, hours
        )));
    }
    let start = request.start.unwrap_or_else(Utc::now);
    let end = start
        .checked_add_signed(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
        .ok_or_else(|| ApiError::Validation(format!("search window from {} is out of range", start)))?;

    let search = PassSearch {
        min_elevation_deg: request.min_elevation.unwrap_or(defaults.min_elevation_deg),
        edges: request.edges,
    };
    let passes = predict_passes(&elements, station, start, end, &search)?;

    Ok(Json(PassResponse {
        success: true,
        satellite: request.tle_name,
        start,
        end,
        count: passes.len(),
        passes,
    }))
}
