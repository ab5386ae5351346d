//! Docmap core: IO-free crawl state, scope rules and structure inference.
mod block;
mod config;
mod effect;
mod frontier;
mod msg;
mod normalize;
mod result;
mod scope;
mod state;
mod structure;
mod update;

pub use block::{ContentBlock, PageExtraction, MAX_HEADING_LEVEL};
pub use config::{
    default_content_selectors, default_skip_extensions, ConfigError, CrawlConfig,
    ValidatedConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES, DEFAULT_REQUEST_DELAY_MS,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
pub use effect::Effect;
pub use frontier::{CrawlTarget, Frontier};
pub use msg::Msg;
pub use normalize::normalize_url;
pub use result::{CrawlResult, ErrorKind, PageError};
pub use scope::{has_skipped_extension, is_in_scope, ScopeFilter};
pub use state::{CrawlState, RunPhase};
pub use structure::{ModuleNode, StructureBuilder};
pub use update::update;
