use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE download from {url} failed: {message}")]
    FetchFailed { url: String, message: String },
    #[error("TLE cache I/O error: {0}")]
    CacheIo(#[from] std::io::Error),
    #[error("Satellite not found in element set: {0}")]
    SatelliteNotFound(String),
    #[error("Invalid TLE for {name}: {message}")]
    InvalidTle { name: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
}

