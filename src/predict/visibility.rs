use chrono::{DateTime, Duration, Utc};

use crate::predict::element_set::ElementRecord;
use crate::predict::error::PredictError;
use crate::predict::propagation::observe;
use crate::predict::GroundStation;

const COARSE_STEP_SECONDS: i64 = 30; // initial scan
const FINE_STEP_SECONDS: i64 = 1; // crossing and apex refinement
const HORIZON_ELEVATION: f64 = 0.0;
const MAX_PASS_HOURS: i64 = 6;

/// A visibility window with AOS/LOS at the 0 degree horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Transit {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub apex: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub apex_azimuth_deg: f64,
}

impl Transit {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Find the transits whose AOS lies in `[start, end]`.
///
/// A satellite already above the horizon at `start` is reported from `start`.
/// LOS is followed past `end` so the last transit is complete. Transits whose
/// maximum elevation stays below `min_elevation` are dropped.
pub fn transits(
    record: &ElementRecord,
    station: &GroundStation,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
    max_count: Option<usize>,
) -> Result<Vec<Transit>, PredictError> {
    let mut result = Vec::new();
    if end < start {
        return Ok(result);
    }

    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);
    let mut prev_time = start;
    let mut prev_visible = is_visible(record, station, start)?;
    let mut aos = prev_visible.then_some(start);

    loop {
        if max_count.is_some_and(|limit| result.len() >= limit) {
            break;
        }

        let cursor = match aos {
            None if prev_time >= end => break,
            None => (prev_time + coarse_step).min(end),
            Some(aos_time) if prev_time - aos_time > Duration::hours(MAX_PASS_HOURS) => {
                log::debug!("{} never sets after {}, dropping", record.name, aos_time);
                break;
            }
            Some(_) => prev_time + coarse_step,
        };

        let visible = is_visible(record, station, cursor)?;

        if visible && !prev_visible {
            aos = Some(refine_crossing(record, station, prev_time, cursor, true)?);
        } else if !visible && prev_visible {
            if let Some(aos_time) = aos.take() {
                let los = refine_crossing(record, station, prev_time, cursor, false)?;
                let transit = build_transit(record, station, aos_time, los)?;
                if transit.max_elevation_deg >= min_elevation {
                    result.push(transit);
                }
            }
        }

        prev_visible = visible;
        prev_time = cursor;
    }

    Ok(result)
}

fn is_visible(
    record: &ElementRecord,
    station: &GroundStation,
    timestamp: DateTime<Utc>,
) -> Result<bool, PredictError> {
    Ok(observe(record, station, timestamp)?.elevation_deg >= HORIZON_ELEVATION)
}

/// Binary search for the horizon crossing between `before` and `after`.
/// Returns the instant on the visible side.
fn refine_crossing(
    record: &ElementRecord,
    station: &GroundStation,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    is_aos: bool, // true = rising, false = setting
) -> Result<DateTime<Utc>, PredictError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = is_visible(record, station, mid)?;
        if above == is_aos {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(if is_aos { high } else { low })
}

/// Locate the apex by ternary search, elevation being unimodal over a pass.
fn build_transit(
    record: &ElementRecord,
    station: &GroundStation,
    aos: DateTime<Utc>,
    los: DateTime<Utc>,
) -> Result<Transit, PredictError> {
    let mut low = aos;
    let mut high = los.max(aos);

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let third = (high - low) / 3;
        let m1 = low + third;
        let m2 = high - third;
        let e1 = observe(record, station, m1)?.elevation_deg;
        let e2 = observe(record, station, m2)?.elevation_deg;
        if e1 < e2 {
            low = m1;
        } else {
            high = m2;
        }
    }

    let apex = observe(record, station, low + (high - low) / 2)?;

    Ok(Transit {
        start: aos,
        end: los.max(aos),
        apex: apex.timestamp,
        max_elevation_deg: apex.elevation_deg,
        apex_azimuth_deg: apex.azimuth_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::element_set::fixtures::{epoch, NOAA_TLE};
    use crate::predict::element_set::ElementSet;

    fn station() -> GroundStation {
        GroundStation::new(48.0, 11.0, 500.0)
    }

    #[test]
    fn finds_horizon_bounded_transits() {
        let set = ElementSet::parse(NOAA_TLE);
        let record = set.get("NOAA 15").unwrap();
        let start = epoch();
        let end = start + Duration::hours(24);

        let found = transits(record, &station(), start, end, 0.0, None).unwrap();
        assert!(!found.is_empty());

        for transit in &found {
            assert!(transit.start >= start && transit.start <= end);
            assert!(transit.end > transit.start);
            assert!(transit.apex >= transit.start && transit.apex <= transit.end);
            // low earth orbit passes are short
            assert!(transit.duration() < Duration::minutes(25));

            let at_aos = observe(record, &station(), transit.start).unwrap();
            let at_los = observe(record, &station(), transit.end).unwrap();
            if transit.start > start {
                assert!(at_aos.elevation_deg >= 0.0 && at_aos.elevation_deg < 1.0);
            }
            assert!(at_los.elevation_deg >= 0.0 && at_los.elevation_deg < 1.0);
            assert!(transit.max_elevation_deg >= at_aos.elevation_deg);
        }

        for pair in found.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn min_elevation_and_max_count_limit_results() {
        let set = ElementSet::parse(NOAA_TLE);
        let record = set.get("NOAA 18").unwrap();
        let start = epoch();
        let end = start + Duration::hours(24);

        let all = transits(record, &station(), start, end, 0.0, None).unwrap();
        let high = transits(record, &station(), start, end, 30.0, None).unwrap();
        assert!(high.len() <= all.len());
        assert!(high.iter().all(|t| t.max_elevation_deg >= 30.0));

        let first = transits(record, &station(), start, end, 0.0, Some(1)).unwrap();
        assert_eq!(first.len(), 1.min(all.len()));
        if let Some(t) = first.first() {
            assert_eq!(t, &all[0]);
        }
    }

    #[test]
    fn empty_window_yields_nothing() {
        let set = ElementSet::parse(NOAA_TLE);
        let record = set.get("NOAA 19").unwrap();
        let start = epoch();

        let found = transits(record, &station(), start, start - Duration::minutes(1), 0.0, None)
            .unwrap();
        assert!(found.is_empty());
    }
}
