use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::predict::{PassService, PredictError};

use super::api::predict as predict_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/passes", get(predict_handlers::list_passes))
        .route("/api/passes/next", get(predict_handlers::next_pass))
        .route("/api/ground-track", post(predict_handlers::ground_track))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let bind_addr = config.web.bind.clone();
    let station = config.ground_station()?;
    let service = PassService::from_config(&config)?;

    let state = AppState {
        station,
        service: Arc::new(service),
    };
    let app = build_router(state);

    log::info!(
        "Starting server on {} for station {}",
        bind_addr,
        config.station.name.as_deref().unwrap_or(&config.station.coordinates)
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
