use utoipa::OpenApi;

use super::api::collision::{CollisionRequest, CollisionResponse};
use super::api::debris::{DebrisPoint, DebrisResponse, DebrisSummaryResponse};
use super::api::error::ErrorResponse;
use super::api::passes::{PassRequest, PassResponse};
use super::api::position::{PositionRequest, PositionResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::collision::predict_collision,
        super::api::debris::debris_data,
        super::api::debris::debris_summary,
        super::api::position::satellite_position,
        super::api::passes::calculate_passes,
    ),
    components(
        schemas(
            CollisionRequest,
            CollisionResponse,
            DebrisPoint,
            DebrisResponse,
            DebrisSummaryResponse,
            PositionRequest,
            PositionResponse,
            PassRequest,
            PassResponse,
            ErrorResponse,
            crate::orbit::AltitudeBand,
            crate::orbit::ElementSummary,
            crate::orbit::GeodeticPosition,
            crate::orbit::StateVector,
            crate::orbit::TrajectoryPoint,
            crate::debris::BandCount,
            crate::debris::BandSummary,
            crate::debris::CatalogLoadReport,
            crate::debris::ClosestApproach,
            crate::debris::CollisionEvent,
            crate::debris::DebrisRecord,
            crate::debris::SkippedRecord,
            crate::debris::SkipReason,
            crate::predict::PassWindow,
            crate::predict::WindowEdges,
        )
    ),
    info(
        title = "Debris Watch API",
        description = "Orbit propagation, debris proximity screening and ground-station pass prediction",
        version = "0.1.0"
    ),
    tags(
        (name = "collision", description = "Debris proximity screening"),
        (name = "debris", description = "Debris catalog snapshots"),
        (name = "position", description = "Single-object position"),
        (name = "passes", description = "Ground-station visibility passes")
    )
)]
pub struct ApiDoc;
