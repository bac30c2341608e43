use std::sync::Arc;

use crate::predict::{GroundStation, PassService};

#[derive(Clone)]
pub struct AppState {
    /// Used when a request names no observer location.
    pub station: GroundStation,
    pub service: Arc<PassService>,
}
