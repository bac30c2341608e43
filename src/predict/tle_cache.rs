use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::TleConfig;
use crate::predict::error::PredictError;

const USER_AGENT: &str = concat!("passwatch/", env!("CARGO_PKG_VERSION"));

/// Where fresh element data comes from.
#[async_trait]
pub trait TleSource: Send + Sync {
    fn url(&self) -> &str;

    /// Write the complete catalog to `path`, returning the number of bytes written.
    async fn download(&self, path: &Path) -> Result<u64, PredictError>;
}

/// Plain GET of a fixed catalog URL.
pub struct HttpTleSource {
    client: Client,
    url: String,
}

impl HttpTleSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PredictError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PredictError::FetchFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { client, url })
    }

    fn fetch_error(&self, err: reqwest::Error) -> PredictError {
        let message = if err.is_timeout() {
            format!("timed out: {}", err)
        } else {
            err.to_string()
        };
        PredictError::FetchFailed {
            url: self.url.clone(),
            message,
        }
    }
}

#[async_trait]
impl TleSource for HttpTleSource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn download(&self, path: &Path) -> Result<u64, PredictError> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        if response.status() != StatusCode::OK {
            return Err(PredictError::FetchFailed {
                url: self.url.clone(),
                message: format!("response status {}", response.status()),
            });
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut len: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| self.fetch_error(e))? {
            len += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(len)
    }
}

/// Local copy of the element catalog, refreshed once it is older than `max_age`.
pub struct TleCache {
    path: PathBuf,
    max_age: Duration,
    source: Arc<dyn TleSource>,
    refresh: Mutex<()>,
}

impl TleCache {
    pub fn new(path: PathBuf, max_age: Duration, source: Arc<dyn TleSource>) -> Self {
        Self {
            path,
            max_age,
            source,
            refresh: Mutex::new(()),
        }
    }

    pub fn from_config(config: &TleConfig) -> Result<Self, PredictError> {
        let source = HttpTleSource::new(config.url.clone(), config.fetch_timeout)?;
        Ok(Self::new(
            config.cache_path.clone(),
            config.max_age,
            Arc::new(source),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the cache file exists and was modified within `max_age`.
    pub async fn is_fresh(&self) -> Result<bool, PredictError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let modified = metadata.modified()?;
        // a timestamp in the future counts as fresh
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        Ok(age <= self.max_age)
    }

    /// Return the cached element text, downloading a replacement first when the
    /// cache is missing or stale. Concurrent callers share one download.
    pub async fn load_element_data(&self) -> Result<String, PredictError> {
        if self.is_fresh().await? {
            log::debug!("Using cached TLEs at {}", self.path.display());
            return Ok(tokio::fs::read_to_string(&self.path).await?);
        }

        let _guard = self.refresh.lock().await;

        // the caller holding the lock before us may already have refreshed
        if !self.is_fresh().await? {
            self.refresh_cache().await?;
        }

        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    async fn refresh_cache(&self) -> Result<(), PredictError> {
        log::info!("Downloading new TLEs from {}", self.source.url());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let partial = self.partial_path();
        match self.source.download(&partial).await {
            Ok(len) => {
                tokio::fs::rename(&partial, &self.path).await?;
                log::info!("Stored {} bytes of TLEs at {}", len, self.path.display());
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                log::error!("TLE download failed: {}", e);
                Err(e)
            }
        }
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".part");
        self.path.with_file_name(name)
    }
}
