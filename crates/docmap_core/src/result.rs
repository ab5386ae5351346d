use std::fmt;

use serde::{Deserialize, Serialize};

use crate::structure::ModuleNode;

/// Per-page failure class recorded in [`CrawlResult::errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Timeout, refused connection, DNS failure, oversized body and similar.
    Network,
    /// Non-2xx response.
    Http,
    /// Response was not HTML.
    ContentType,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Http => write!(f, "http error"),
            ErrorKind::ContentType => write!(f, "content type error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageError {
    pub url: String,
    pub reason: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl PageError {
    pub fn new(url: impl Into<String>, kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
            kind,
            status: None,
        }
    }

    pub fn http(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(url, ErrorKind::Http, reason)
        }
    }
}

/// Output of one finished (or cancelled) crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub tree: ModuleNode,
    pub pages_visited: usize,
    pub errors: Vec<PageError>,
    #[serde(default)]
    pub cancelled: bool,
}

impl CrawlResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    /// True when a page failed for a reason other than not being HTML.
    /// Non-HTML links are skipped pages, not run failures.
    pub fn has_page_failures(&self) -> bool {
        self.errors
            .iter()
            .any(|error| error.kind != ErrorKind::ContentType)
    }
}
