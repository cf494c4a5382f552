use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::debris::{BandSummary, CatalogLoadReport};
use crate::orbit::{AltitudeBand, BandFilter};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

const MAX_RETURNED_DEBRIS: usize = 1000;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DebrisQuery {
    /// Altitude band index 0-4; empty or absent for all bands.
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebrisPoint {
    pub name: String,
    pub norad_id: u64,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub category: String,
    pub band: AltitudeBand,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebrisResponse {
    pub success: bool,
    pub at: DateTime<Utc>,
    pub filter: BandFilter,
    /// All matching records, including those beyond the returned list.
    pub count: usize,
    pub debris: Vec<DebrisPoint>,
    pub report: CatalogLoadReport,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebrisSummaryResponse {
    pub success: bool,
    pub at: DateTime<Utc>,
    pub summary: BandSummary,
}

fn band_filter(category: Option<&str>) -> ApiResult<BandFilter> {
    let category = match category.map(str::trim) {
        None | Some("") => return Ok(BandFilter::AllBands),
        Some(c) => c,
    };
    category
        .parse::<i64>()
        .ok()
        .and_then(AltitudeBand::from_index)
        .map(BandFilter::SpecificBand)
        .ok_or_else(|| ApiError::Validation(format!("unknown altitude category {:?}", category)))
}

#[utoipa::path(
    get,
    path = "/api/debris-data",
    tag = "debris",
    params(DebrisQuery),
    responses(
        (status = 200, description = "Debris positions now", body = DebrisResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 503, description = "No debris catalog loaded", body = ErrorResponse)
    )
)]
pub async fn debris_data(
    State(state): State<AppState>,
    Query(query): Query<DebrisQuery>,
) -> ApiResult<Json<DebrisResponse>> {
    let filter = band_filter(query.category.as_deref())?;
    let catalog = state
        .catalog
        .as_ref()
        .ok_or(ApiError::CatalogUnavailable)?;

    let (snapshot, report) = catalog.snapshot(Utc::now(), filter);
    let debris = snapshot
        .records()
        .iter()
        .take(MAX_RETURNED_DEBRIS)
        .map(|r| DebrisPoint {
            name: r.name.clone(),
            norad_id: r.norad_id,
            lat: r.geodetic.latitude_deg,
            lon: r.geodetic.longitude_deg,
            alt: r.geodetic.altitude_km,
            category: r.band.label(),
            band: r.band,
        })
        .collect();

    Ok(Json(DebrisResponse {
        success: true,
        at: snapshot.at(),
        filter: snapshot.filter(),
        count: snapshot.len(),
        debris,
        report,
    }))
}

#[utoipa::path(
    get,
    path = "/api/debris-summary",
    tag = "debris",
    responses(
        (status = 200, description = "Per-band debris counts now", body = DebrisSummaryResponse),
        (status = 503, description = "No debris catalog loaded", body = ErrorResponse)
    )
)]
pub async fn debris_summary(State(state): State<AppState>) -> ApiResult<Json<DebrisSummaryResponse>> {
    let catalog = state
        .catalog
        .as_ref()
        .ok_or(ApiError::CatalogUnavailable)?;
    let (snapshot, _) = catalog.snapshot(Utc::now(), BandFilter::AllBands);

    Ok(Json(DebrisSummaryResponse {
        success: true,
        at: snapshot.at(),
        summary: snapshot.band_summary(),
    }))
}
