use crate::block::PageExtraction;
use crate::frontier::CrawlTarget;
use crate::result::PageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Validate the configuration and seed the frontier.
    Start,
    /// The in-flight page was fetched and parsed.
    PageFetched {
        target: CrawlTarget,
        /// URL the content was served from after redirects.
        final_url: String,
        page: PageExtraction,
    },
    /// The in-flight page could not be fetched or decoded.
    PageFailed {
        target: CrawlTarget,
        error: PageError,
    },
    /// User stopped the run; accumulated blocks still form a result.
    CancelRequested,
}
