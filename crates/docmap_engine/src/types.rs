use std::fmt;

use docmap_core::{ErrorKind, PageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    /// URL after redirects; relative links on the page resolve against it.
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Converts the failure into the entry recorded in the crawl result.
    pub fn to_page_error(&self, url: &str) -> PageError {
        let reason = self.to_string();
        match self.kind {
            FailureKind::HttpStatus(status) | FailureKind::RedirectOutOfScope { status, .. } => {
                PageError::http(url, status, reason)
            }
            _ => PageError::new(url, self.kind.error_kind(), reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    /// A redirect pointed outside the allowed domains and was not followed.
    RedirectOutOfScope { status: u16, location: String },
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl FailureKind {
    /// Class of the failure in the crawl result's error list.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            FailureKind::HttpStatus(_) | FailureKind::RedirectOutOfScope { .. } => ErrorKind::Http,
            FailureKind::UnsupportedContentType { .. } => ErrorKind::ContentType,
            FailureKind::InvalidUrl
            | FailureKind::Timeout
            | FailureKind::RedirectLimitExceeded
            | FailureKind::TooLarge { .. }
            | FailureKind::Network => ErrorKind::Network,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::RedirectOutOfScope { status, location } => {
                write!(f, "http status {status} to out-of-scope {location}")
            }
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Progress notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    PageStarted {
        url: String,
        depth: usize,
    },
    PageVisited {
        url: String,
        blocks: usize,
        links: usize,
        pages_visited: usize,
    },
    PageFailed {
        url: String,
        reason: String,
    },
    Finished {
        pages_visited: usize,
        errors: usize,
        cancelled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_maps_to_http_error_with_status() {
        let err = FetchError::new(FailureKind::HttpStatus(500), "500 Internal Server Error");
        let page = err.to_page_error("https://d.example.com/x");
        assert_eq!(page.kind, ErrorKind::Http);
        assert_eq!(page.status, Some(500));
        assert_eq!(page.reason, "http status 500: 500 Internal Server Error");
    }

    #[test]
    fn timeouts_and_size_limits_are_network_errors() {
        assert_eq!(FailureKind::Timeout.error_kind(), ErrorKind::Network);
        assert_eq!(
            FailureKind::TooLarge {
                max_bytes: 1,
                actual: None
            }
            .error_kind(),
            ErrorKind::Network
        );
        assert_eq!(
            FailureKind::UnsupportedContentType {
                content_type: "application/pdf".into()
            }
            .error_kind(),
            ErrorKind::ContentType
        );
    }
}
