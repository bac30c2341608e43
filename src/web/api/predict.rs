use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{GeoPoint, GroundStation, Pass, PassSummary, MAX_TRACK_SAMPLES};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

const MAX_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PassesQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_m: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesResponse {
    pub station: GroundStation,
    pub passes: Vec<Pass>,
    pub summaries: Vec<PassSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NextPassQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_m: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NextPassResponse {
    pub pass: Option<Pass>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GroundTrackRequest {
    pub pass: Pass,
    pub samples: usize,
}

#[utoipa::path(
    get,
    path = "/api/passes",
    tag = "predict",
    params(
        ("latitude" = Option<f64>, Query, description = "Observer latitude (degrees), defaults to the configured station"),
        ("longitude" = Option<f64>, Query, description = "Observer longitude (degrees)"),
        ("altitude_m" = Option<f64>, Query, description = "Observer altitude (meters)"),
        ("start" = Option<String>, Query, description = "Window start (RFC3339), defaults to now"),
        ("end" = Option<String>, Query, description = "Window end (RFC3339), defaults to start + list window")
    ),
    responses(
        (status = 200, description = "Passes sorted by start time", body = PassesResponse),
        (status = 400, description = "Invalid parameters or a window longer than seven days", body = ErrorResponse),
        (status = 404, description = "Tracked satellite missing from element data", body = ErrorResponse),
        (status = 502, description = "TLE download failed", body = ErrorResponse)
    )
)]
pub async fn list_passes(
    State(state): State<AppState>,
    Query(query): Query<PassesQuery>,
) -> ApiResult<Json<PassesResponse>> {
    let station = resolve_station(&state, query.latitude, query.longitude, query.altitude_m)?;

    let now = Utc::now();
    let (start, end) = resolve_window(
        query.start.unwrap_or(now),
        query.end,
        state.service.finder().config().list_window,
    )?;

    let passes = state.service.list_passes_between(&station, start, end).await?;
    let summaries = state.service.summarize(&passes, now);

    Ok(Json(PassesResponse {
        station,
        passes,
        summaries,
    }))
}

#[utoipa::path(
    get,
    path = "/api/passes/next",
    tag = "predict",
    params(
        ("latitude" = Option<f64>, Query, description = "Observer latitude (degrees), defaults to the configured station"),
        ("longitude" = Option<f64>, Query, description = "Observer longitude (degrees)"),
        ("altitude_m" = Option<f64>, Query, description = "Observer altitude (meters)"),
        ("start" = Option<String>, Query, description = "Reference time (RFC3339), defaults to now")
    ),
    responses(
        (status = 200, description = "First pass starting within the next-pass window, if any", body = NextPassResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Tracked satellite missing from element data", body = ErrorResponse),
        (status = 502, description = "TLE download failed", body = ErrorResponse)
    )
)]
pub async fn next_pass(
    State(state): State<AppState>,
    Query(query): Query<NextPassQuery>,
) -> ApiResult<Json<NextPassResponse>> {
    let station = resolve_station(&state, query.latitude, query.longitude, query.altitude_m)?;
    let start = query.start.unwrap_or_else(Utc::now);

    let pass = state.service.determine_pass(&station, start).await?;
    Ok(Json(NextPassResponse { pass }))
}

#[utoipa::path(
    post,
    path = "/api/ground-track",
    tag = "predict",
    request_body = GroundTrackRequest,
    responses(
        (status = 200, description = "Sub-satellite points from the pass start", body = Vec<GeoPoint>),
        (status = 400, description = "Invalid sample count", body = ErrorResponse),
        (status = 404, description = "Satellite missing from element data", body = ErrorResponse),
        (status = 502, description = "TLE download failed", body = ErrorResponse)
    )
)]
pub async fn ground_track(
    State(state): State<AppState>,
    Json(request): Json<GroundTrackRequest>,
) -> ApiResult<Json<Vec<GeoPoint>>> {
    if request.samples > MAX_TRACK_SAMPLES {
        return Err(ApiError::Validation(format!(
            "samples must not exceed {}",
            MAX_TRACK_SAMPLES
        )));
    }

    let points = state
        .service
        .satellite_positions(&request.pass, request.samples)
        .await?;
    Ok(Json(points))
}

fn resolve_window(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    default_length: Duration,
) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
    let end = end.unwrap_or(start + default_length);
    if end <= start {
        return Err(ApiError::Validation("end must be after start".into()));
    }
    if end - start > Duration::days(MAX_WINDOW_DAYS) {
        return Err(ApiError::Validation(format!(
            "window must not exceed {} days",
            MAX_WINDOW_DAYS
        )));
    }
    Ok((start, end))
}

fn resolve_station(
    state: &AppState,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude_m: Option<f64>,
) -> ApiResult<GroundStation> {
    match (latitude, longitude) {
        (None, None) => Ok(state.station),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(ApiError::Validation("coordinates out of range".into()));
            }
            Ok(GroundStation::new(lat, lon, altitude_m.unwrap_or(0.0)))
        }
        _ => Err(ApiError::Validation(
            "latitude and longitude must be given together".into(),
        )),
    }
}

fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}
