pub mod cleaner;
pub mod document;
pub mod extractor;
pub mod http_client;

use crate::error::ScrapeError;
use async_trait::async_trait;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source: the live HTTP client, or canned pages in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.get_bytes(url).await
    }
}
