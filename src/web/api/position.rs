use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::orbit::{ElementSummary, Propagator, TrajectoryPoint};
use crate::web::api::element_set;
use crate::web::api::error::{ApiResult, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionRequest {
    pub tle_name: Option<String>,
    pub tle_line1: String,
    pub tle_line2: String,
    /// Defaults to now.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PositionResponse {
    pub success: bool,
    pub time: DateTime<Utc>,
    pub position: TrajectoryPoint,
    pub orbital_period: f64,
    pub elements: ElementSummary,
}

#[utoipa::path(
    post,
    path = "/api/satellite-position",
    tag = "position",
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position at the requested instant", body = PositionResponse),
        (status = 400, description = "Malformed element set", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse)
    )
)]
pub async fn satellite_position(
    Json(request): Json<PositionRequest>,
) -> ApiResult<Json<PositionResponse>> {
    let elements = element_set(
        request.tle_name.as_deref(),
        &request.tle_line1,
        &request.tle_line2,
    )?;
    let at = request.at.unwrap_or_else(Utc::now);

    let state = Propagator::new(&elements)?.propagate(at)?;
    let position = TrajectoryPoint::from_state(state)?;

    Ok(Json(PositionResponse {
        success: true,
        time: at,
        position,
        orbital_period: elements.period_minutes(),
        elements: elements.summary(),
    }))
}
