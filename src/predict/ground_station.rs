use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// WGS-84
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Observer location ("qth"): geodetic latitude and longitude in degrees,
/// altitude above the ellipsoid in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
        }
    }
}

impl GroundStation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Parses `"lat, lon"` as written in the station config.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon, altitude_m.unwrap_or(0.0)))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let a = EARTH_EQUATORIAL_RADIUS_KM;
        let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        let x = (n + alt_km) * cos_lat * lon.cos();
        let y = (n + alt_km) * cos_lat * lon.sin();
        let z = (n * (1.0 - e2) + alt_km) * sin_lat;
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_string() {
        let station = GroundStation::from_coordinates("52.52, 13.405", Some(34.0)).unwrap();
        assert_eq!(station.latitude_deg, 52.52);
        assert_eq!(station.longitude_deg, 13.405);
        assert_eq!(station.altitude_m, 34.0);

        let station = GroundStation::from_coordinates("-33.9,18.4", None).unwrap();
        assert_eq!(station.altitude_m, 0.0);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(GroundStation::from_coordinates("52.52", None).is_none());
        assert!(GroundStation::from_coordinates("north, east", None).is_none());
        assert!(GroundStation::from_coordinates("95.0, 10.0", None).is_none());
        assert!(GroundStation::from_coordinates("1, 2, 3", None).is_none());
    }

    #[test]
    fn ecef_on_equator_and_pole() {
        let equator = GroundStation::default().position_ecef_km();
        assert!((equator[0] - EARTH_EQUATORIAL_RADIUS_KM).abs() < 1e-9);
        assert!(equator[1].abs() < 1e-9);
        assert!(equator[2].abs() < 1e-9);

        let pole = GroundStation::new(90.0, 0.0, 0.0).position_ecef_km();
        // polar radius
        assert!((pole[2] - 6356.752).abs() < 1e-2);
    }
}
