use chrono::{DateTime, Duration, Utc};

use crate::config::PredictConfig;
use crate::predict::element_set::{ElementRecord, ElementSet};
use crate::predict::error::PredictError;
use crate::predict::propagation::observe;
use crate::predict::types::{Direction, Pass, TrackedSatellite};
use crate::predict::visibility::{transits, Transit};
use crate::predict::GroundStation;

/// Finds passes of the tracked satellites over a ground station.
pub struct PassFinder {
    satellites: Vec<TrackedSatellite>,
    config: PredictConfig,
}

impl PassFinder {
    pub fn new(satellites: Vec<TrackedSatellite>, config: PredictConfig) -> Self {
        Self { satellites, config }
    }

    pub fn satellite(&self, name: &str) -> Option<&TrackedSatellite> {
        self.satellites.iter().find(|s| s.name == name)
    }

    pub fn config(&self) -> &PredictConfig {
        &self.config
    }

    /// All passes in the window peaking at or above the configured minimum,
    /// with AOS/LOS refined to `min_elevation_deg`, sorted by start time.
    pub fn find_passes(
        &self,
        elements: &ElementSet,
        station: &GroundStation,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Pass>, PredictError> {
        let mut passes = Vec::new();

        for satellite in &self.satellites {
            let record = elements.get(&satellite.name)?;
            let candidates = transits(
                record,
                station,
                start,
                end,
                self.config.min_elevation_deg,
                None,
            )?;
            log::debug!("{}: {} candidate passes", satellite.name, candidates.len());

            for transit in candidates {
                let (aos, los) = self.refine_boundaries(record, station, &transit)?;
                let pass = self.annotate(record, station, &transit, aos, los)?;
                if self.worth_watching(&pass) {
                    passes.push(pass);
                }
            }
        }

        // stable, so equal starts keep registry order
        passes.sort_by_key(|p| p.start);
        Ok(passes)
    }

    /// First qualifying pass starting within `next_pass_window` of `reference`,
    /// in registry order. Boundaries are not refined.
    pub fn find_next_pass(
        &self,
        elements: &ElementSet,
        station: &GroundStation,
        reference: DateTime<Utc>,
    ) -> Result<Option<Pass>, PredictError> {
        let end = reference + self.config.next_pass_window;

        for satellite in &self.satellites {
            let record = elements.get(&satellite.name)?;
            let candidates = transits(
                record,
                station,
                reference,
                end,
                self.config.min_elevation_deg,
                None,
            )?;

            for transit in candidates {
                let pass = self.annotate(record, station, &transit, transit.start, transit.end)?;
                if self.worth_watching(&pass) {
                    return Ok(Some(pass));
                }
            }
        }

        Ok(None)
    }

    fn worth_watching(&self, pass: &Pass) -> bool {
        pass.max_elevation_deg >= self.config.min_max_elevation_deg
    }

    /// Move AOS forward and LOS backward in steps of a fixed fraction of the
    /// pass duration until the elevation reaches `min_elevation_deg`, giving up
    /// after `refine_max_steps` steps on each side.
    fn refine_boundaries(
        &self,
        record: &ElementRecord,
        station: &GroundStation,
        transit: &Transit,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), PredictError> {
        let threshold = self.config.min_elevation_deg;

        let mut step = self.fraction_of(transit.duration());
        let mut aos = transit.start;
        let mut remaining = self.config.refine_max_steps;
        let mut observed = observe(record, station, aos)?;
        while observed.elevation_deg < threshold && remaining > 0 {
            remaining -= 1;
            aos += step;
            observed = observe(record, station, aos)?;
        }

        // the LOS walk steps by a fraction of the already shortened pass
        step = self.fraction_of(transit.end - aos);
        let mut los = transit.end;
        let mut remaining = self.config.refine_max_steps;
        let mut observed = observe(record, station, los)?;
        while observed.elevation_deg < threshold && remaining > 0 {
            remaining -= 1;
            los -= step;
            observed = observe(record, station, los)?;
        }

        Ok((aos, los))
    }

    fn fraction_of(&self, duration: Duration) -> Duration {
        let ms = duration.num_milliseconds() as f64 * self.config.refine_step_fraction;
        Duration::milliseconds(ms.round() as i64)
    }

    fn annotate(
        &self,
        record: &ElementRecord,
        station: &GroundStation,
        transit: &Transit,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Pass, PredictError> {
        let at_start = observe(record, station, start)?;

        Ok(Pass {
            satellite: record.name.clone(),
            start,
            end,
            duration_ms: (end - start).num_milliseconds(),
            max_elevation_deg: transit.max_elevation_deg,
            apex_azimuth_deg: transit.apex_azimuth_deg,
            direction: Direction::from_latitudes(at_start.latitude_deg, station.latitude_deg),
        })
    }
}
