use crate::config::ConfigError;
use crate::frontier::CrawlTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch and extract this page, then report back with a message.
    Fetch(CrawlTarget),
    /// The run reached `Completed`; call `CrawlState::into_result`.
    Finished,
    /// The run reached `Failed` before any request was made.
    Abort(ConfigError),
}
