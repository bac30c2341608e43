use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::predict::element_set::ElementSet;
use crate::predict::error::PredictError;
use crate::predict::ground_track::sample_ground_track;
use crate::predict::pass_finder::PassFinder;
use crate::predict::summary::PassSummary;
use crate::predict::tle_cache::TleCache;
use crate::predict::types::{GeoPoint, Pass};
use crate::predict::GroundStation;

/// Entry point for pass queries: loads element data through the cache and
/// runs the finder or sampler on it.
pub struct PassService {
    cache: TleCache,
    finder: PassFinder,
}

impl PassService {
    pub fn new(cache: TleCache, finder: PassFinder) -> Self {
        Self { cache, finder }
    }

    pub fn from_config(config: &Config) -> Result<Self, PredictError> {
        let cache = TleCache::from_config(&config.tle)?;
        let finder = PassFinder::new(config.satellites.clone(), config.predict.clone());
        Ok(Self::new(cache, finder))
    }

    pub fn finder(&self) -> &PassFinder {
        &self.finder
    }

    pub async fn element_set(&self) -> Result<ElementSet, PredictError> {
        let content = self.cache.load_element_data().await?;
        Ok(ElementSet::parse(&content))
    }

    /// Upcoming passes over the configured list window, as table rows.
    pub async fn list_passes(&self, station: &GroundStation) -> Result<Vec<PassSummary>, PredictError> {
        self.list_passes_at(station, Utc::now()).await
    }

    /// Table rows for the list window starting at `now`.
    pub async fn list_passes_at(
        &self,
        station: &GroundStation,
        now: DateTime<Utc>,
    ) -> Result<Vec<PassSummary>, PredictError> {
        let end = now + self.finder.config().list_window;
        let passes = self.list_passes_between(station, now, end).await?;
        Ok(self.summarize(&passes, now))
    }

    pub async fn list_passes_between(
        &self,
        station: &GroundStation,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Pass>, PredictError> {
        let elements = self.element_set().await?;
        self.finder.find_passes(&elements, station, start, end)
    }

    /// The pass to record next, if one starts within the next-pass window.
    pub async fn determine_pass(
        &self,
        station: &GroundStation,
        start_time: DateTime<Utc>,
    ) -> Result<Option<Pass>, PredictError> {
        let elements = self.element_set().await?;
        self.finder.find_next_pass(&elements, station, start_time)
    }

    pub async fn satellite_positions(
        &self,
        pass: &Pass,
        sample_count: usize,
    ) -> Result<Vec<GeoPoint>, PredictError> {
        let elements = self.element_set().await?;
        sample_ground_track(
            &elements,
            pass,
            sample_count,
            self.finder.config().sample_interval,
        )
    }

    pub fn summarize(&self, passes: &[Pass], now: DateTime<Utc>) -> Vec<PassSummary> {
        passes
            .iter()
            .filter_map(|pass| {
                let satellite = self.finder.satellite(&pass.satellite)?;
                Some(PassSummary::new(pass, satellite, now))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::Duration;

    use super::*;
    use crate::config::{default_satellites, PredictConfig};
    use crate::predict::element_set::fixtures::{epoch, NOAA_TLE};
    use crate::predict::tle_cache::testing::FakeSource;

    fn service(dir: &Path, source: Arc<FakeSource>) -> PassService {
        let cache = TleCache::new(dir.join("noaa.txt"), StdDuration::from_secs(86_400), source);
        PassService::new(
            cache,
            PassFinder::new(default_satellites(), PredictConfig::default()),
        )
    }

    fn station() -> GroundStation {
        GroundStation::new(48.0, 11.0, 500.0)
    }

    #[tokio::test]
    async fn queries_share_the_cached_download() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(NOAA_TLE));
        let service = service(dir.path(), source.clone());

        let start = epoch();
        let passes = service
            .list_passes_between(&station(), start, start + Duration::hours(24))
            .await
            .unwrap();
        assert!(!passes.is_empty());

        let track = service.satellite_positions(&passes[0], 25).await.unwrap();
        assert_eq!(track.len(), 25);
        assert_eq!(track[24].timestamp, passes[0].start + Duration::milliseconds(12_000));

        let reference = passes[0].start - Duration::minutes(5);
        let next = service.determine_pass(&station(), reference).await.unwrap();
        assert!(next.is_some());

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn summaries_follow_pass_order() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), Arc::new(FakeSource::new(NOAA_TLE)));

        let start = epoch();
        let passes = service
            .list_passes_between(&station(), start, start + Duration::hours(24))
            .await
            .unwrap();
        let rows = service.summarize(&passes, start - Duration::hours(1));

        assert_eq!(rows.len(), passes.len());
        for (row, pass) in rows.iter().zip(&passes) {
            assert_eq!(row.satellite, pass.satellite);
            assert_eq!(row.direction, pass.direction.to_string());
            assert_ne!(row.countdown, "Ongoing");
        }
    }

    #[tokio::test]
    async fn listed_rows_cover_the_day_in_start_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(NOAA_TLE));
        let service = service(dir.path(), source.clone());

        let now = epoch();
        let rows = service.list_passes_at(&station(), now).await.unwrap();
        let passes = service
            .list_passes_between(&station(), now, now + Duration::hours(24))
            .await
            .unwrap();

        assert!(!rows.is_empty());
        assert_eq!(rows.len(), passes.len());
        for (row, pass) in rows.iter().zip(&passes) {
            assert_eq!(row.satellite, pass.satellite);
            assert_eq!(row.start_time, pass.start.format("%m-%d %H:%M:%S").to_string());
            assert!(row.max_elevation_deg().unwrap() >= 20);
        }
        for pair in passes.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn missing_satellite_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let only_noaa_15 = NOAA_TLE.split("NOAA 18").next().unwrap().to_string();
        let service = service(dir.path(), Arc::new(FakeSource::new(&only_noaa_15)));

        let err = service
            .list_passes_between(&station(), epoch(), epoch() + Duration::hours(2))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::SatelliteNotFound(name) if name == "NOAA 18"));
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_query() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), Arc::new(FakeSource::failing()));

        let err = service
            .list_passes_between(&station(), epoch(), epoch() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::FetchFailed { .. }));
    }
}
