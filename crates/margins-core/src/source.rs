//! Content sources
//!
//! A [`ContentSource`] resolves resource paths such as `content/meta.json`
//! relative to a content base. Two real sources exist:
//! - [`HttpSource`]: a published site, fetched with reqwest
//! - [`DirSource`]: a local checkout of the content tree
//!
//! [`MemorySource`] backs tests and counts every fetch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;

/// User agent sent with remote requests
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Margins/1.0)";

/// Something content resources can be read from
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Fetch a resource as text
    async fn fetch_text(&self, resource: &str) -> Result<String, FetchError>;

    /// Fetch a resource and parse it as JSON
    async fn fetch_json<T: DeserializeOwned>(&self, resource: &str) -> Result<T, FetchError> {
        let text = self.fetch_text(resource).await?;
        serde_json::from_str(&text).map_err(|source| FetchError::Parse {
            resource: resource.to_string(),
            source,
        })
    }

    /// Human-readable description of where content comes from
    fn describe(&self) -> String;
}

/// Remote content over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Transport {
                resource: base.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base: normalize_base(base),
        })
    }

    /// Absolute URL for a resource
    pub fn url_for(&self, resource: &str) -> String {
        format!("{}{}", self.base, resource.trim_start_matches('/'))
    }
}

/// Ensure a base URL ends in a directory separator
fn normalize_base(base: &str) -> String {
    let base = base
        .strip_suffix("index.html")
        .unwrap_or(base)
        .trim_end_matches('/');
    format!("{}/", base)
}

impl ContentSource for HttpSource {
    async fn fetch_text(&self, resource: &str) -> Result<String, FetchError> {
        let url = self.url_for(resource);
        debug!("GET {}", url);

        let transport = |source| FetchError::Transport {
            resource: resource.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                resource: resource.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }

    fn describe(&self) -> String {
        self.base.clone()
    }
}

/// Content tree on the local filesystem
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirSource {
    async fn fetch_text(&self, resource: &str) -> Result<String, FetchError> {
        let path = self.root.join(resource.trim_start_matches('/'));
        debug!("Reading {:?}", path);

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
                resource: resource.to_string(),
            }),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Source chosen from the configured content base
#[derive(Debug, Clone)]
pub enum Source {
    Http(HttpSource),
    Dir(DirSource),
}

impl Source {
    /// `http://` and `https://` bases are remote; anything else is a directory
    pub fn from_base(base: &str, timeout: Duration) -> Result<Self, FetchError> {
        let lower = base.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Http(HttpSource::new(base, timeout)?))
        } else {
            Ok(Source::Dir(DirSource::new(base)))
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::from_base(
            &config.content_base,
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }
}

impl ContentSource for Source {
    async fn fetch_text(&self, resource: &str) -> Result<String, FetchError> {
        match self {
            Source::Http(source) => source.fetch_text(resource).await,
            Source::Dir(source) => source.fetch_text(resource).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Http(source) => source.describe(),
            Source::Dir(source) => source.describe(),
        }
    }
}

/// In-memory source that records every fetch
#[derive(Debug, Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource
    pub fn with(mut self, resource: &str, body: impl Into<String>) -> Self {
        self.resources.insert(resource.to_string(), body.into());
        self
    }

    /// Replace or add a resource in place
    pub fn insert(&mut self, resource: &str, body: impl Into<String>) {
        self.resources.insert(resource.to_string(), body.into());
    }

    /// Every resource requested so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn fetch_count(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or_default()
    }

    /// Forget the fetch log
    pub fn reset_log(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl ContentSource for MemorySource {
    async fn fetch_text(&self, resource: &str) -> Result<String, FetchError> {
        if let Ok(mut log) = self.log.lock() {
            log.push(resource.to_string());
        }
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                resource: resource.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("memory ({} resources)", self.resources.len())
    }
}
