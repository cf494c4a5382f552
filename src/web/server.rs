use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, ConfigError};
use crate::debris::ElementCatalog;
use crate::predict::GroundStation;

use super::api::collision as collision_handlers;
use super::api::debris as debris_handlers;
use super::api::passes as pass_handlers;
use super::api::position as position_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Observer used when a pass request names no position.
    pub station: GroundStation,
    /// Parsed once at startup; absent when no catalog is configured or it
    /// could not be read.
    pub catalog: Option<Arc<ElementCatalog>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let catalog = config.debris.as_ref().and_then(|debris| {
            match std::fs::read_to_string(&debris.catalog_file) {
                Ok(content) => {
                    let catalog = ElementCatalog::parse(&content);
                    log::info!(
                        "Loaded {} element sets from {}",
                        catalog.len(),
                        debris.catalog_file.display()
                    );
                    Some(catalog)
                }
                Err(e) => {
                    log::warn!(
                        "Failed to read debris catalog {}: {}",
                        debris.catalog_file.display(),
                        e
                    );
                    None
                }
            }
        });

        Self::with_catalog(config, catalog)
    }

    /// Resolve the configured station and wrap an already parsed catalog.
    pub fn with_catalog(
        config: Config,
        catalog: Option<ElementCatalog>,
    ) -> Result<Self, ConfigError> {
        let station = config.station()?;
        log::info!(
            "Default observer {} at {}, {} ({} m)",
            config.station.name.as_deref().unwrap_or("station"),
            station.latitude_deg,
            station.longitude_deg,
            station.altitude_m
        );

        Ok(Self {
            config: Arc::new(config),
            station,
            catalog: catalog.map(Arc::new),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/predict-collision",
            post(collision_handlers::predict_collision),
        )
        .route("/api/debris-data", get(debris_handlers::debris_data))
        .route("/api/debris-summary", get(debris_handlers::debris_summary))
        .route(
            "/api/satellite-position",
            post(position_handlers::satellite_position),
        )
        .route("/api/calculate-passes", post(pass_handlers::calculate_passes))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.web.bind.clone();
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_is_resolved_at_startup() {
        let config = Config::from_yaml(
            r#"
station:
  coordinates: "-6.2, 106.816666"
  altitude_m: 5
"#,
        )
        .unwrap();
        let state = AppState::new(config).unwrap();
        assert_eq!(state.station, GroundStation::new(-6.2, 106.816666, 5.0));
        assert!(state.catalog.is_none());

        let config = Config::from_yaml("station:\n  coordinates: \"95, 10\"\n").unwrap();
        assert!(matches!(
            AppState::new(config),
            Err(ConfigError::Coordinates(_))
        ));
    }
}
