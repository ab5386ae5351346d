use crawl_logging::{crawl_debug, crawl_info, crawl_warn};

use crate::block::{ContentBlock, PageExtraction};
use crate::config::{ConfigError, CrawlConfig, ValidatedConfig};
use crate::frontier::{CrawlTarget, Frontier};
use crate::normalize::normalize_url;
use crate::result::{CrawlResult, ErrorKind, PageError};
use crate::scope::has_skipped_extension;
use crate::structure::StructureBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Run-scoped crawl context: frontier, accumulated blocks, errors and counters.
///
/// Each run owns its own `CrawlState`, so independent runs never share a
/// visited set or block list.
#[derive(Debug, Clone)]
pub struct CrawlState {
    config: CrawlConfig,
    validated: Option<ValidatedConfig>,
    phase: RunPhase,
    frontier: Frontier,
    in_flight: Option<CrawlTarget>,
    blocks: Vec<ContentBlock>,
    errors: Vec<PageError>,
    pages_visited: usize,
    cancelled: bool,
    failure: Option<ConfigError>,
}

impl CrawlState {
    pub fn new(config: CrawlConfig) -> Self {
        let frontier = Frontier::new(config.max_pages, config.max_depth);
        Self {
            config,
            validated: None,
            phase: RunPhase::Idle,
            frontier,
            in_flight: None,
            blocks: Vec::new(),
            errors: Vec::new(),
            pages_visited: 0,
            cancelled: false,
            failure: None,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn errors(&self) -> &[PageError] {
        &self.errors
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn pending(&self) -> usize {
        self.frontier.size()
    }

    pub fn in_flight(&self) -> Option<&CrawlTarget> {
        self.in_flight.as_ref()
    }

    pub fn failure(&self) -> Option<&ConfigError> {
        self.failure.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Folds everything accumulated so far into the final result.
    pub fn into_result(self) -> CrawlResult {
        let (root_name, prune) = match &self.validated {
            Some(v) => (v.root_name.clone(), v.prune_empty_modules),
            None => (String::new(), false),
        };
        let tree = StructureBuilder::new(root_name)
            .with_prune_empty(prune)
            .build(&self.blocks);
        CrawlResult {
            tree,
            pages_visited: self.pages_visited,
            errors: self.errors,
            cancelled: self.cancelled,
        }
    }

    pub(crate) fn start(&mut self) -> Result<(), ConfigError> {
        match self.config.validate() {
            Ok(validated) => {
                for seed in &validated.seeds {
                    self.frontier.push(seed.as_str(), 0);
                }
                crawl_info!(
                    "crawl started: {} seed(s), max_pages={} max_depth={}",
                    validated.seeds.len(),
                    validated.max_pages,
                    validated.max_depth
                );
                self.validated = Some(validated);
                self.phase = RunPhase::Running;
                Ok(())
            }
            Err(err) => {
                self.phase = RunPhase::Failed;
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// True when `target` is the page the driver was asked to fetch.
    pub(crate) fn is_in_flight(&self, target: &CrawlTarget) -> bool {
        self.phase == RunPhase::Running && self.in_flight.as_ref() == Some(target)
    }

    /// Folds in a fetched page. `final_url` is where the content came from;
    /// when a redirect led outside the allowed domains the page is recorded
    /// as an error, and when it led to an already visited page the content
    /// is skipped.
    pub(crate) fn accept_page(&mut self, final_url: &str, page: PageExtraction) {
        let Some(target) = self.in_flight.take() else {
            return;
        };
        if normalize_url(final_url) != normalize_url(&target.url) {
            if let Some(validated) = &self.validated {
                if !validated.scope.is_in_scope(final_url) {
                    crawl_warn!("{} redirected out of scope to {final_url}", target.url);
                    self.errors.push(PageError::new(
                        target.url,
                        ErrorKind::Http,
                        format!("redirected outside the allowed domains to {final_url}"),
                    ));
                    return;
                }
            }
            if !self.frontier.mark_visited(final_url) {
                crawl_debug!(
                    "{} redirected to already visited {final_url}; content skipped",
                    target.url
                );
                self.pages_visited += 1;
                return;
            }
        }
        let admitted = match &self.validated {
            Some(validated) => {
                let mut admitted = 0;
                for link in &page.links {
                    if !validated.scope.is_in_scope(link)
                        || has_skipped_extension(link, &validated.skip_extensions)
                    {
                        continue;
                    }
                    if self.frontier.push(link, target.depth + 1) {
                        admitted += 1;
                    }
                }
                admitted
            }
            None => 0,
        };
        crawl_debug!(
            "{}: {} block(s), {} link(s), {} admitted",
            target.url,
            page.blocks.len(),
            page.links.len(),
            admitted
        );
        self.blocks.extend(page.blocks);
        self.pages_visited += 1;
    }

    pub(crate) fn record_error(&mut self, error: PageError) {
        self.in_flight = None;
        self.errors.push(error);
    }

    pub(crate) fn next_target(&mut self) -> Option<CrawlTarget> {
        let target = self.frontier.pop()?;
        self.in_flight = Some(target.clone());
        Some(target)
    }

    pub(crate) fn complete(&mut self) {
        self.in_flight = None;
        self.phase = RunPhase::Completed;
        crawl_info!(
            "crawl completed: {} page(s) visited, {} error(s)",
            self.pages_visited,
            self.errors.len()
        );
    }

    pub(crate) fn cancel(&mut self) {
        let dropped = self.frontier.clear_pending();
        self.cancelled = true;
        self.complete();
        crawl_info!("crawl cancelled with {dropped} pending page(s) left unvisited");
    }
}
