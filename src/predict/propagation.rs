use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::predict::element_set::ElementRecord;
use crate::predict::error::PredictError;
use crate::predict::ground_station::{GroundStation, EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING};

const GEODETIC_ITERATIONS: usize = 20;

/// Look angles and sub-satellite point at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// SGP4 position (TEME, km) at `timestamp`.
pub fn propagate(record: &ElementRecord, timestamp: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
    let minutes = record
        .elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = record
        .constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;
    Ok(prediction.position)
}

/// Greenwich mean sidereal time in radians.
pub fn sidereal_time(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

/// Geodetic latitude and longitude (degrees) of an inertial position.
pub fn inertial_to_geodetic(pos_teme: [f64; 3], gmst: f64) -> (f64, f64) {
    let [x, y, z] = pos_teme;
    let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
    let r = (x * x + y * y).sqrt();

    let longitude = (y.atan2(x) - gmst).to_degrees();
    let longitude = (longitude + 180.0).rem_euclid(360.0) - 180.0;

    let mut latitude = z.atan2(r);
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        let c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (z + EARTH_EQUATORIAL_RADIUS_KM * c * e2 * sin_lat).atan2(r);
    }

    (latitude.to_degrees(), longitude)
}

pub fn observe(
    record: &ElementRecord,
    station: &GroundStation,
    timestamp: DateTime<Utc>,
) -> Result<Observation, PredictError> {
    let position = propagate(record, timestamp)?;
    let sidereal = sidereal_time(timestamp);

    let sat_ecef = teme_to_ecef_position(position, sidereal);
    let sta_ecef = station.position_ecef_km();

    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let enu = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (enu.2 / range_km).asin().to_degrees()
    } else {
        0.0
    };

    let (latitude_deg, longitude_deg) = inertial_to_geodetic(position, sidereal);

    Ok(Observation {
        timestamp,
        elevation_deg: elevation,
        azimuth_deg: azimuth,
        range_km,
        latitude_deg,
        longitude_deg,
    })
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
