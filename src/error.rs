use std::path::PathBuf;

use reqwest::StatusCode;

/// Failures of the fetch → parse → extract → write chain.
///
/// Every variant is terminal for the chart being processed. A field that
/// cannot be found in a row is not an error; it degrades to an empty value
/// inside the extractor.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Transport failure, timeout, or a body that could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Anything other than `200 OK`.
    #[error("status code error for {url}: {status}")]
    Status { url: String, status: StatusCode },

    /// Document bytes that cannot be tokenized.
    #[error("could not parse document: {0}")]
    Parse(String),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Destination file could not be created, written or flushed.
    #[error("could not write {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ScrapeError {
    pub fn sink(path: &std::path::Path, source: impl Into<csv::Error>) -> Self {
        ScrapeError::Sink {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
