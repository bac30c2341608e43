use chrono::Duration;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use thiserror::Error;

use crate::predict::{GroundStation, TrackedSatellite};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid station coordinates: {0}")]
    InvalidStation(String),
    #[error("No satellites configured")]
    NoSatellites,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub tle: TleConfig,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default = "default_satellites")]
    pub satellites: Vec<TrackedSatellite>,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleConfig {
    #[serde(default = "default_tle_url")]
    pub url: String,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    #[serde(default = "default_max_age", deserialize_with = "deserialize_std_duration")]
    pub max_age: std::time::Duration,
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "deserialize_std_duration"
    )]
    pub fetch_timeout: std::time::Duration,
}

impl Default for TleConfig {
    fn default() -> Self {
        Self {
            url: default_tle_url(),
            cache_path: default_cache_path(),
            max_age: default_max_age(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

fn default_tle_url() -> String {
    "https://celestrak.org/NORAD/elements/noaa.txt".to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/noaa.txt")
}

fn default_max_age() -> std::time::Duration {
    std::time::Duration::from_secs(24 * 60 * 60)
}

fn default_fetch_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(30)
}

/// Thresholds and windows used by the pass finder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    /// AOS/LOS elevation that refined passes start and end at.
    pub min_elevation_deg: f64,
    /// Passes peaking below this are not reported.
    pub min_max_elevation_deg: f64,
    pub refine_max_steps: u32,
    /// Refinement step as a fraction of the pass duration.
    pub refine_step_fraction: f64,
    #[serde(deserialize_with = "deserialize_duration")]
    pub list_window: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub next_pass_window: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub sample_interval: Duration,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            min_elevation_deg: 8.0,
            min_max_elevation_deg: 20.0,
            refine_max_steps: 50,
            refine_step_fraction: 0.01,
            list_window: Duration::hours(24),
            next_pass_window: Duration::minutes(20),
            sample_interval: Duration::milliseconds(500),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn default_satellites() -> Vec<TrackedSatellite> {
    vec![
        TrackedSatellite::new("NOAA 15", 137.62),
        TrackedSatellite::new("NOAA 18", 137.9125),
        TrackedSatellite::new("NOAA 19", 137.1),
    ]
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        if config.satellites.is_empty() {
            return Err(ConfigError::NoSatellites);
        }
        config.ground_station()?;
        Ok(config)
    }

    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        GroundStation::from_coordinates(&self.station.coordinates, Some(self.station.altitude_m))
            .ok_or_else(|| ConfigError::InvalidStation(self.station.coordinates.clone()))
    }
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

fn deserialize_std_duration<'de, D>(deserializer: D) -> Result<std::time::Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
