//! Content probes
//!
//! A probe checks whether one candidate content URL exists. Images get a
//! lightweight existence check; embedded documents are loaded in full.
//! Any failure means "not here" and is never fatal.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use thiserror::Error;
use tracing::{debug, trace};

use crate::layer::DisplayMode;

/// Transport-level timeout of the HTTP client.
///
/// Probe deadlines are enforced by the resolver; this only bounds sockets
/// that outlive an abandoned probe.
const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("mapprobe/", env!("CARGO_PKG_VERSION"));

/// Why a probe did not find content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Existence check for content URLs.
pub trait ContentProbe: Send + Sync {
    /// Succeeds if content exists at `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Candidate content location
    /// * `mode` - `Image` for an existence check, `Embedded` for a full load
    fn probe(
        &self,
        url: &str,
        mode: DisplayMode,
    ) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// HTTP probe using reqwest.
///
/// Requests bypass caches so a freshly published file is seen at once.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_CLIENT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProbeError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl ContentProbe for HttpProbe {
    async fn probe(&self, url: &str, mode: DisplayMode) -> Result<(), ProbeError> {
        trace!(url = url, mode = %mode, "HTTP probe starting");

        let request = match mode {
            DisplayMode::Image => self.client.head(url),
            DisplayMode::Embedded => self.client.get(url),
        };
        let transport = |e: reqwest::Error| ProbeError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = request
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = url, status = status.as_u16(), "probe got error status");
            return Err(ProbeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if mode == DisplayMode::Embedded {
            response.bytes().await.map_err(transport)?;
        }
        Ok(())
    }
}

/// Probe over a local directory tree.
///
/// Relative URLs are resolved against `root`; `file://` URLs are used
/// as-is.
#[derive(Debug, Clone)]
pub struct FsProbe {
    root: PathBuf,
}

impl FsProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path a content URL refers to.
    pub fn path_for(&self, url: &str) -> PathBuf {
        // Query strings have no meaning on disk
        let url = url.split(['?', '#']).next().unwrap_or(url);
        match url.strip_prefix("file://") {
            Some(absolute) => PathBuf::from(absolute),
            None => self.root.join(url),
        }
    }
}

impl ContentProbe for FsProbe {
    async fn probe(&self, url: &str, mode: DisplayMode) -> Result<(), ProbeError> {
        let path = self.path_for(url);
        let io = |e: std::io::Error| ProbeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(io)?;
        if !metadata.is_file() {
            return Err(ProbeError::Io {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }
        if mode == DisplayMode::Embedded {
            tokio::fs::read(&path).await.map_err(io)?;
        }
        trace!(path = %path.display(), "file probe found content");
        Ok(())
    }
}

/// Probe that picks HTTP or filesystem access by URL scheme.
#[derive(Clone)]
pub struct DefaultProbe {
    http: HttpProbe,
    fs: FsProbe,
}

impl DefaultProbe {
    pub fn new(fs_root: impl Into<PathBuf>) -> Result<Self, ProbeError> {
        Ok(Self {
            http: HttpProbe::new()?,
            fs: FsProbe::new(fs_root),
        })
    }
}

/// True for URLs that need a network request.
pub fn is_remote(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl ContentProbe for DefaultProbe {
    async fn probe(&self, url: &str, mode: DisplayMode) -> Result<(), ProbeError> {
        if is_remote(url) {
            self.http.probe(url, mode).await
        } else {
            self.fs.probe(url, mode).await
        }
    }
}
