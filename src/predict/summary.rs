use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::types::{Pass, TrackedSatellite};

const ONGOING_THRESHOLD_MS: i64 = 10_000;

/// Table row for a pass, as printed by the CLI and served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PassSummary {
    #[serde(rename = "Satellite")]
    pub satellite: String,
    #[serde(rename = "Freq")]
    pub frequency: String,
    #[serde(rename = "Direction")]
    pub direction: String,
    #[serde(rename = "Max Elevation")]
    pub max_elevation: String,
    #[serde(rename = "Countdown")]
    pub countdown: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "Duration")]
    pub duration: String,
}

impl PassSummary {
    pub fn new(pass: &Pass, satellite: &TrackedSatellite, now: DateTime<Utc>) -> Self {
        let side = if pass.apex_azimuth_deg > 180.0 { 'W' } else { 'E' };

        Self {
            satellite: pass.satellite.clone(),
            frequency: format!("{:.4}", satellite.frequency_mhz),
            direction: pass.direction.to_string(),
            max_elevation: format!("{}{}", pass.max_elevation_deg.round() as i64, side),
            countdown: format_countdown(pass.start - now),
            start_time: pass.start.format("%m-%d %H:%M:%S").to_string(),
            duration: format_duration(pass.duration()),
        }
    }

    /// Rounded maximum elevation without the E/W suffix.
    pub fn max_elevation_deg(&self) -> Option<i64> {
        self.max_elevation
            .trim_end_matches(&['E', 'W'][..])
            .parse()
            .ok()
    }
}

/// `Ongoing` when the pass starts in under ten seconds, otherwise `HH:MM:SS`
/// with the hours wrapping at a day.
pub fn format_countdown(until_start: Duration) -> String {
    let ms = until_start.num_milliseconds();
    if ms < ONGOING_THRESHOLD_MS {
        return "Ongoing".to_string();
    }
    let secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// `mm:ss`, minutes wrapping at an hour.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_milliseconds().max(0) / 1000;
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}
