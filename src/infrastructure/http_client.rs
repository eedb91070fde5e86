//! HTTP client for page fetching
//!
//! The core only sees the narrow [`PageFetcher`] seam: a status code and
//! body, or a transport failure. Rate-limit handling and retries live in
//! `retry_manager`; this client never retries on its own.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::config::SourceConfig;

/// Raw page as returned by the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused/reset, DNS, timeout or a body cut off mid-read
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP client could not be built: {0}")]
    ClientBuild(String),
}

impl FetchError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Fetch collaborator: `fetch(url) → (status, body) | transport failure`
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    pub fn from_source_config(source: &SourceConfig) -> Self {
        Self {
            timeout_seconds: source.request_timeout_seconds,
            user_agent: source.user_agent.clone(),
            follow_redirects: source.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_source_config(&SourceConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn from_source_config(source: &SourceConfig) -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::from_source_config(source))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        info!("🌐 HTTP GET: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(url, format!("failed to read body: {e}")))?;

        debug!("HTTP {} ({} bytes): {}", status, body.len(), url);
        Ok(FetchedPage { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::from_source_config(&SourceConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = HttpClientConfig {
            timeout_seconds: 10,
            user_agent: "Test Agent".to_string(),
            follow_redirects: false,
        };

        let client = HttpClient::with_config(config).unwrap();
        assert_eq!(client.config().user_agent, "Test Agent");
    }

    #[test]
    fn only_429_counts_as_rate_limited() {
        let mut page = FetchedPage::ok("");
        assert!(!page.is_rate_limited());
        page.status = 429;
        assert!(page.is_rate_limited());
        page.status = 503;
        assert!(!page.is_rate_limited());
    }
}
