//! HTTP client for page fetching
//!
//! Thin reqwest wrapper with timeout, user agent, optional cookie session
//! and a bounded retry on transport errors. Response status is deliberately
//! not inspected here: the extractor treats missing page elements as the
//! not-found signal, so a 404 body is as useful as a 200 body.

use anyhow::{Result, anyhow};
use reqwest::{Client, ClientBuilder, cookie::Jar};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of attempts for failed requests
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 3,
            user_agent: "cardbuff/0.2 (card catalog research)".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a client without a cookie session
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a client that sends the given cookie jar with every request
    pub fn with_cookie_jar(config: HttpClientConfig, jar: Arc<Jar>) -> Result<Self> {
        Self::build(config, Some(jar))
    }

    fn build(config: HttpClientConfig, jar: Option<Arc<Jar>>) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        builder = match jar {
            Some(jar) => builder.cookie_provider(jar),
            None => builder.cookie_store(true),
        };

        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    /// Fetch a page body with retry and exponential backoff on transport errors
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);

        let mut last_error = None;

        for attempt in 1..=self.config.max_retries.max(1) {
            match self.fetch_text_once(url).await {
                Ok(body) => {
                    debug!("Fetched {} on attempt {}", url, attempt);
                    return Ok(body);
                }
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt, url, e);
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        let delay_seconds = 2_u64.pow(attempt - 1);
                        sleep(Duration::from_secs(delay_seconds)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown error while fetching {}", url)))
    }

    async fn fetch_text_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?;

        if body.is_empty() {
            return Err(anyhow!("Empty response from {}", url));
        }

        Ok(body)
    }
}
