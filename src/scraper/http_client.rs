use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Every request carries the configured `accept-language` header and is
    /// bounded by `timeout_secs`.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .with_context(|| format!("Invalid accept-language {:?}", config.accept_language))?,
        );

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// Fetch a URL and return the raw body. Single attempt; anything but
    /// `200 OK` is an error.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::Status { url: url.to_string(), status });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })?;

        debug!("{}: {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}
