use chrono::{DateTime, Duration, Utc};

use crate::predict::element_set::ElementSet;
use crate::predict::error::PredictError;
use crate::predict::propagation::{inertial_to_geodetic, propagate, sidereal_time};
use crate::predict::types::{GeoPoint, Pass};

/// Upper bound on ground-track samples accepted from callers.
pub const MAX_TRACK_SAMPLES: usize = 10_000;

/// Sub-satellite points of `pass`, `sample_count` of them, `interval` apart
/// starting at the pass start.
pub fn sample_ground_track(
    elements: &ElementSet,
    pass: &Pass,
    sample_count: usize,
    interval: Duration,
) -> Result<Vec<GeoPoint>, PredictError> {
    let record = elements.get(&pass.satellite)?;
    let mut points = Vec::with_capacity(sample_count.min(MAX_TRACK_SAMPLES));

    for i in 0..sample_count {
        let timestamp = sample_time(pass.start, interval, i).ok_or_else(|| {
            PredictError::Propagation(format!("ground-track sample {} is out of time range", i))
        })?;
        let position = propagate(record, timestamp)?;
        let (latitude_deg, longitude_deg) = inertial_to_geodetic(position, sidereal_time(timestamp));
        points.push(GeoPoint {
            timestamp,
            latitude_deg,
            longitude_deg,
        });
    }

    Ok(points)
}

/// `start + interval * index`, or `None` when that leaves the representable range.
fn sample_time(start: DateTime<Utc>, interval: Duration, index: usize) -> Option<DateTime<Utc>> {
    let index = i32::try_from(index).ok()?;
    start.checked_add_signed(interval.checked_mul(index)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::element_set::fixtures::{epoch, NOAA_TLE};
    use crate::predict::propagation::observe;
    use crate::predict::types::Direction;
    use crate::predict::GroundStation;

    fn pass_of(satellite: &str) -> Pass {
        Pass {
            satellite: satellite.to_string(),
            start: epoch(),
            end: epoch() + Duration::minutes(12),
            duration_ms: 12 * 60 * 1000,
            max_elevation_deg: 45.0,
            apex_azimuth_deg: 90.0,
            direction: Direction::Southbound,
        }
    }

    #[test]
    fn samples_at_fixed_cadence() {
        let set = ElementSet::parse(NOAA_TLE);
        let pass = pass_of("NOAA 18");
        let interval = Duration::milliseconds(500);

        let track = sample_ground_track(&set, &pass, 40, interval).unwrap();
        assert_eq!(track.len(), 40);
        for (i, point) in track.iter().enumerate() {
            assert_eq!(point.timestamp, pass.start + Duration::milliseconds(500 * i as i64));
            assert!((-90.0..=90.0).contains(&point.latitude_deg));
            assert!((-180.0..=180.0).contains(&point.longitude_deg));
        }

        // ~7 km/s ground speed, so consecutive half-second samples are close
        for pair in track.windows(2) {
            assert!((pair[0].latitude_deg - pair[1].latitude_deg).abs() < 0.1);
        }
    }

    #[test]
    fn matches_observed_sub_point() {
        let set = ElementSet::parse(NOAA_TLE);
        let pass = pass_of("NOAA 15");
        let track = sample_ground_track(&set, &pass, 3, Duration::milliseconds(500)).unwrap();

        let record = set.get("NOAA 15").unwrap();
        let observed = observe(record, &GroundStation::default(), track[2].timestamp).unwrap();
        assert!((observed.latitude_deg - track[2].latitude_deg).abs() < 1e-9);
        assert!((observed.longitude_deg - track[2].longitude_deg).abs() < 1e-9);
    }

    #[test]
    fn zero_samples_is_empty() {
        let set = ElementSet::parse(NOAA_TLE);
        let track =
            sample_ground_track(&set, &pass_of("NOAA 19"), 0, Duration::milliseconds(500)).unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn sample_times_do_not_wrap() {
        let interval = Duration::milliseconds(500);
        assert_eq!(sample_time(epoch(), interval, 4), Some(epoch() + Duration::seconds(2)));
        assert_eq!(
            sample_time(epoch(), Duration::milliseconds(1), i32::MAX as usize),
            Some(epoch() + Duration::milliseconds(i32::MAX as i64))
        );
        assert_eq!(sample_time(epoch(), interval, i32::MAX as usize + 1), None);
        assert_eq!(sample_time(epoch(), Duration::days(1_000_000), 1_000), None);
    }

    #[test]
    fn unknown_satellite_fails_fast() {
        let set = ElementSet::parse(NOAA_TLE);
        let err = sample_ground_track(&set, &pass_of("GOES 16"), 10, Duration::milliseconds(500))
            .unwrap_err();
        assert!(matches!(err, PredictError::SatelliteNotFound(name) if name == "GOES 16"));
    }
}
