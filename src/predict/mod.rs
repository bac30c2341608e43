mod element_set;
mod error;
mod ground_station;
mod ground_track;
mod pass_finder;
mod propagation;
mod service;
mod summary;
mod tle_cache;
mod types;
mod visibility;

pub use element_set::{ElementRecord, ElementSet};
pub use error::PredictError;
pub use ground_station::GroundStation;
pub use ground_track::{sample_ground_track, MAX_TRACK_SAMPLES};
pub use pass_finder::PassFinder;
pub use propagation::{observe, Observation};
pub use service::PassService;
pub use summary::PassSummary;
pub use tle_cache::{HttpTleSource, TleCache, TleSource};
pub use types::{Direction, GeoPoint, Pass, TrackedSatellite};
pub use visibility::{transits, Transit};
