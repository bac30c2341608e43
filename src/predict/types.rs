use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A satellite we look for in the element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackedSatellite {
    pub name: String,
    pub frequency_mhz: f64,
}

impl TrackedSatellite {
    pub fn new(name: impl Into<String>, frequency_mhz: f64) -> Self {
        Self {
            name: name.into(),
            frequency_mhz,
        }
    }
}

/// Ground track direction relative to the observer at AOS.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum_macros::Display,
)]
pub enum Direction {
    /// Satellite rises north of the observer and heads south.
    #[strum(serialize = "S")]
    #[serde(rename = "S")]
    Southbound,
    #[strum(serialize = "N")]
    #[serde(rename = "N")]
    Northbound,
}

impl Direction {
    pub fn from_latitudes(satellite_lat_deg: f64, station_lat_deg: f64) -> Self {
        if satellite_lat_deg > station_lat_deg {
            Direction::Southbound
        } else {
            Direction::Northbound
        }
    }
}

/// A predicted satellite pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pass {
    pub satellite: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_ms: i64,
    pub max_elevation_deg: f64,
    pub apex_azimuth_deg: f64,
    pub direction: Direction,
}

impl Pass {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// One ground-track sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_latitude() {
        assert_eq!(Direction::from_latitudes(55.0, 48.0), Direction::Southbound);
        assert_eq!(Direction::from_latitudes(40.0, 48.0), Direction::Northbound);
        assert_eq!(Direction::from_latitudes(48.0, 48.0), Direction::Northbound);
        assert_eq!(Direction::Southbound.to_string(), "S");
        assert_eq!(Direction::Northbound.to_string(), "N");
    }

    #[test]
    fn direction_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Direction::Northbound).unwrap(), "\"N\"");
        let d: Direction = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(d, Direction::Southbound);
    }
}
