use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::predict::{GroundTrackRequest, NextPassResponse, PassesResponse};
use crate::predict::{Direction, GeoPoint, GroundStation, Pass, PassSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::predict::list_passes,
        super::api::predict::next_pass,
        super::api::predict::ground_track,
    ),
    components(
        schemas(
            PassesResponse,
            NextPassResponse,
            GroundTrackRequest,
            ErrorResponse,
            Pass,
            PassSummary,
            Direction,
            GeoPoint,
            GroundStation,
        )
    ),
    info(
        title = "Passwatch API",
        description = "Pass predictions for tracked weather satellites",
        version = "0.1.0"
    ),
    tags(
        (name = "predict", description = "Pass prediction and ground tracks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/passes".to_string()));
        assert!(paths.contains(&"/api/passes/next".to_string()));
        assert!(paths.contains(&"/api/ground-track".to_string()));
    }
}
