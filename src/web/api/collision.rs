use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::debris::{screen, CatalogLoadReport, ClosestApproach, CollisionEvent, ScreeningParams};
use crate::orbit::{AltitudeBand, ElementSummary};
use crate::web::api::element_set;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

/// Collision events returned per response; `collision_count` covers all.
const MAX_REPORTED_EVENTS: usize = 10;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CollisionRequest {
    pub tle_name: Option<String>,
    pub tle_line1: String,
    pub tle_line2: String,
    pub num_periods: Option<u32>,
    /// Minutes between trajectory samples.
    pub time_step: Option<f64>,
    /// km
    pub threshold: Option<f64>,
    #[serde(default)]
    pub same_band: bool,
    /// Defaults to now.
    pub start: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollisionResponse {
    pub success: bool,
    pub object: ElementSummary,
    pub start: DateTime<Utc>,
    pub start_band: Option<AltitudeBand>,
    pub threshold_km: f64,
    pub collision: bool,
    pub collision_count: usize,
    /// Null when nothing was compared.
    pub min_distance_km: Option<f64>,
    pub closest: Option<ClosestApproach>,
    pub collision_points: Vec<CollisionEvent>,
    pub trajectory_points: usize,
    pub dropped_samples: usize,
    pub catalog: CatalogLoadReport,
}

#[utoipa::path(
    post,
    path = "/api/predict-collision",
    tag = "collision",
    request_body = CollisionRequest,
    responses(
        (status = 200, description = "Proximity screening result", body = CollisionResponse),
        (status = 400, description = "Malformed element set or parameters", body = ErrorResponse),
        (status = 503, description = "No debris catalog loaded", body = ErrorResponse)
    )
)]
pub async fn predict_collision(
    State(state): State<AppState>,
    Json(request): Json<CollisionRequest>,
) -> ApiResult<Json<CollisionResponse>> {
    let elements = element_set(
        request.tle_name.as_deref(),
        &request.tle_line1,
        &request.tle_line2,
    )?;
    let catalog = state
        .catalog
        .as_ref()
        .ok_or(ApiError::CatalogUnavailable)?;

    let defaults = &state.config.analysis;
    let params = ScreeningParams {
        num_periods: request.num_periods.unwrap_or(defaults.num_periods),
        step_minutes: request.time_step.unwrap_or(defaults.step_minutes),
        threshold_km: request.threshold.unwrap_or(defaults.threshold_km),
        same_band: request.same_band,
        max_steps: defaults.max_trajectory_steps,
    };
    let start = request.start.unwrap_or_else(Utc::now);

    let screening = screen(&elements, catalog, start, &params)?;
    let result = screening.result;

    Ok(Json(CollisionResponse {
        success: true,
        object: screening.object,
        start: screening.start,
        start_band: screening.start_band,
        threshold_km: result.threshold_km,
        collision: result.collision,
        collision_count: result.collision_count,
        min_distance_km: Some(result.min_distance_km).filter(|d| d.is_finite()),
        closest: result.closest,
        collision_points: result.events.into_iter().take(MAX_REPORTED_EVENTS).collect(),
        trajectory_points: screening.trajectory_points,
        dropped_samples: screening.dropped_samples,
        catalog: screening.catalog,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::debris::catalog::tests::{catalog_epoch, DEBRIS_TEXT};
    use crate::debris::ElementCatalog;
    use crate::orbit::elements::tests::{ISS_LINE1, ISS_LINE2};
    use crate::orbit::OrbitError;

    fn state(catalog: Option<&str>) -> AppState {
        let config = Config::from_yaml("station:\n  coordinates: \"-6.2, 106.816666\"\n").unwrap();
        AppState::with_catalog(config, catalog.map(ElementCatalog::parse)).unwrap()
    }

    fn request(threshold: f64) -> CollisionRequest {
        CollisionRequest {
            tle_name: Some("ISS (ZARYA)".into()),
            tle_line1: ISS_LINE1.into(),
            tle_line2: ISS_LINE2.into(),
            num_periods: Some(1),
            time_step: Some(5.0),
            threshold: Some(threshold),
            same_band: false,
            start: Some(catalog_epoch()),
        }
    }

    #[tokio::test]
    async fn reports_at_most_ten_collision_points() {
        let Json(response) = predict_collision(State(state(Some(DEBRIS_TEXT))), Json(request(100_000.0)))
            .await
            .ok()
            .unwrap();

        assert!(response.collision);
        assert_eq!(response.collision_count, response.trajectory_points * 3);
        assert_eq!(response.collision_points.len(), MAX_REPORTED_EVENTS);
        assert_eq!(response.catalog.skipped_count(), 1);
        assert!(response.min_distance_km.is_some());
    }

    #[tokio::test]
    async fn empty_catalog_has_null_minimum() {
        let Json(response) = predict_collision(State(state(Some(""))), Json(request(5.0)))
            .await
            .ok()
            .unwrap();
        assert!(!response.collision);
        assert_eq!(response.min_distance_km, None);
        assert!(response.closest.is_none());
    }

    #[tokio::test]
    async fn missing_catalog_and_bad_lines_are_errors() {
        let result = predict_collision(State(state(None)), Json(request(5.0))).await;
        assert!(matches!(result, Err(ApiError::CatalogUnavailable)));

        let mut bad = request(5.0);
        bad.tle_line2 = "  ".into();
        let result = predict_collision(State(state(Some(DEBRIS_TEXT))), Json(bad)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn oversized_sampling_is_a_bad_request() {
        let mut bad = request(5.0);
        bad.time_step = Some(1e-9);
        let result = predict_collision(State(state(Some(DEBRIS_TEXT))), Json(bad)).await;
        assert!(matches!(
            result,
            Err(ApiError::Orbit(OrbitError::InvalidParameter(_)))
        ));

        let mut bad = request(5.0);
        bad.num_periods = Some(u32::MAX);
        bad.time_step = Some(1_000_000.0);
        let result = predict_collision(State(state(Some(DEBRIS_TEXT))), Json(bad)).await;
        assert!(matches!(
            result,
            Err(ApiError::Orbit(OrbitError::InvalidParameter(_)))
        ));
    }
}
