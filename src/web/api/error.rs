use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::orbit::OrbitError;
use crate::predict::PredictError;

pub enum ApiError {
    Validation(String),
    Orbit(OrbitError),
    Predict(PredictError),
    CatalogUnavailable,
}

impl From<OrbitError> for ApiError {
    fn from(e: OrbitError) -> Self {
        ApiError::Orbit(e)
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::Orbit(inner) => ApiError::Orbit(inner),
            other => ApiError::Predict(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("validation_failed", &msg),
            ),
            ApiError::Orbit(e) => {
                let (status, kind) = match e {
                    OrbitError::MalformedElementSet(_) => {
                        (StatusCode::BAD_REQUEST, "malformed_element_set")
                    }
                    OrbitError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "invalid_parameter"),
                    OrbitError::PropagationFailure { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "propagation_failure")
                    }
                    OrbitError::DegenerateRadius => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "degenerate_radius")
                    }
                };
                (status, ErrorResponse::with_message(kind, &e.to_string()))
            }
            ApiError::Predict(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("invalid_search", &e.to_string()),
            ),
            ApiError::CatalogUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("catalog_unavailable"),
            ),
        };

        if status.is_server_error() {
            log::error!("Request failed: {}", body.error);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::PropagationStatus;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (
                ApiError::Orbit(OrbitError::MalformedElementSet("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Orbit(OrbitError::PropagationFailure {
                    status: PropagationStatus::PERTURBED_ECCENTRICITY,
                    message: "decayed".into(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                PredictError::InvalidStep.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PredictError::Orbit(OrbitError::DegenerateRadius).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::CatalogUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
