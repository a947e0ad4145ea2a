//! Queryable document tree.
//!
//! The extractor only talks to [`Document`]; [`HtmlDocument`] is the
//! `scraper`-backed implementation used for live pages.

use crate::error::ScrapeError;
use ::scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use tracing::debug;

/// Selector-driven read access to a parsed page.
pub trait Document {
    /// Compiled form of a selector string.
    type Query;
    type Node<'a>: Copy
    where
        Self: 'a;

    fn compile(selector: &str) -> Result<Self::Query, ScrapeError>;

    /// All matches in document order.
    fn find<'a>(&'a self, query: &Self::Query) -> Vec<Self::Node<'a>>;

    /// Matches among the descendants of `node`, in document order.
    fn find_within<'a>(&'a self, node: Self::Node<'a>, query: &Self::Query) -> Vec<Self::Node<'a>>;

    fn text(&self, node: Self::Node<'_>) -> String;

    fn attr<'a>(&'a self, node: Self::Node<'a>, name: &str) -> Option<&'a str>;
}

// ── HTML backend ──────────────────────────────────────────────────────────────

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Build the tree from a raw response body.
    ///
    /// Mis-encoded bytes become U+FFFD and parsing carries on. A body holding
    /// NUL bytes is binary, not markup, and is rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self, ScrapeError> {
        if let Some(at) = bytes.iter().position(|&b| b == 0) {
            return Err(ScrapeError::Parse(format!("binary body (NUL byte at offset {at})")));
        }

        let text = String::from_utf8_lossy(bytes);
        if let Cow::Owned(_) = text {
            debug!("body is not valid UTF-8, invalid sequences replaced");
        }

        let html = Html::parse_document(&text);
        if !html.errors.is_empty() {
            debug!("{} recoverable markup errors", html.errors.len());
        }
        Ok(Self { html })
    }
}

impl Document for HtmlDocument {
    type Query = Selector;
    type Node<'a> = ElementRef<'a>;

    fn compile(selector: &str) -> Result<Selector, ScrapeError> {
        Selector::parse(selector).map_err(|e| ScrapeError::Selector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn find<'a>(&'a self, query: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(query).collect()
    }

    fn find_within<'a>(&'a self, node: ElementRef<'a>, query: &Selector) -> Vec<ElementRef<'a>> {
        node.select(query).collect()
    }

    fn text(&self, node: ElementRef<'_>) -> String {
        node.text().collect()
    }

    fn attr<'a>(&'a self, node: ElementRef<'a>, name: &str) -> Option<&'a str> {
        node.value().attr(name)
    }
}
