use serde::{Deserialize, Serialize};

pub const MAX_HEADING_LEVEL: u8 = 3;

/// One heading and the body text that follows it on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// 1, 2 or 3 (from `h1`, `h2`, `h3`).
    pub level: u8,
    pub heading: String,
    pub body: String,
    pub source_url: String,
}

impl ContentBlock {
    pub fn new(
        level: u8,
        heading: impl Into<String>,
        body: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            level,
            heading: heading.into(),
            body: body.into(),
            source_url: source_url.into(),
        }
    }
}

/// Everything the extractor pulls out of a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub blocks: Vec<ContentBlock>,
    /// Absolute, fragment-free, duplicate-free links in first-seen order.
    pub links: Vec<String>,
}
