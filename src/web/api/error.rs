use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::PredictError;

pub enum ApiError {
    Validation(String),
    Predict(PredictError),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError::Predict(e)
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("validation_failed", msg),
            ),
            ApiError::Predict(e) => {
                let (status, code) = match e {
                    PredictError::SatelliteNotFound(_) => {
                        (StatusCode::NOT_FOUND, "satellite_not_found")
                    }
                    PredictError::FetchFailed { .. } => (StatusCode::BAD_GATEWAY, "tle_fetch_failed"),
                    PredictError::CacheIo(_) => (StatusCode::INTERNAL_SERVER_ERROR, "tle_cache_error"),
                    PredictError::InvalidTle { .. } | PredictError::Propagation(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed")
                    }
                };
                (status, ErrorResponse::with_message(code, &e.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            log::error!("{}: {:?}", body.error, body.message);
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
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
