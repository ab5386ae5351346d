use std::collections::VecDeque;
use std::sync::Arc;

use crawl_logging::{crawl_debug, crawl_info};
use docmap_core::{
    update, ConfigError, CrawlConfig, CrawlResult, CrawlState, CrawlTarget, Effect, Msg,
};
use tokio_util::sync::CancellationToken;

use crate::decode::decode_html;
use crate::extract::{ContentExtractor, ExtractSettings, HeadingExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{CrawlEvent, FetchError};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

/// Sink for callers that do not display progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: CrawlEvent) {}
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("could not build http client: {0}")]
    Client(#[from] FetchError),
}

/// Drives one crawl run: executes the effects of the core state machine and
/// feeds fetch/extract outcomes back into it. One page is in flight at a time.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ContentExtractor>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Builds the default reqwest fetcher and heading extractor for `config`.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, RunError> {
        let fetcher = ReqwestFetcher::new(FetchSettings::from_config(config))?;
        let extractor = HeadingExtractor::new(ExtractSettings::from_config(config));
        Ok(Self::new(Arc::new(fetcher), Arc::new(extractor)))
    }

    /// Runs the crawl to completion or cancellation.
    ///
    /// Cancellation is checked before every fetch; a cancelled run still
    /// returns the tree built from the pages fetched so far.
    pub async fn run(
        &self,
        config: CrawlConfig,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<CrawlResult, RunError> {
        let (mut state, effects) = update(CrawlState::new(config), Msg::Start);
        let mut pending: VecDeque<Effect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let msg = match effect {
                Effect::Fetch(target) => {
                    if cancel.is_cancelled() {
                        crawl_info!("cancellation requested before {}", target.url);
                        Msg::CancelRequested
                    } else {
                        self.visit(target, state.pages_visited(), sink).await
                    }
                }
                Effect::Finished => break,
                Effect::Abort(err) => return Err(err.into()),
            };
            let (next, effects) = update(state, msg);
            state = next;
            pending.extend(effects);
        }

        let result = state.into_result();
        sink.emit(CrawlEvent::Finished {
            pages_visited: result.pages_visited,
            errors: result.errors.len(),
            cancelled: result.cancelled,
        });
        Ok(result)
    }

    async fn visit(&self, target: CrawlTarget, visited_so_far: usize, sink: &dyn ProgressSink) -> Msg {
        sink.emit(CrawlEvent::PageStarted {
            url: target.url.clone(),
            depth: target.depth,
        });

        match self.fetcher.fetch(&target.url).await {
            Ok(output) => {
                let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
                if decoded.had_replacements {
                    crawl_debug!(
                        "{}: malformed {} sequences replaced",
                        target.url,
                        decoded.encoding_label
                    );
                }
                let final_url = output.metadata.final_url;
                let page = self.extractor.extract(&decoded.html, &final_url);
                sink.emit(CrawlEvent::PageVisited {
                    url: target.url.clone(),
                    blocks: page.blocks.len(),
                    links: page.links.len(),
                    pages_visited: visited_so_far + 1,
                });
                Msg::PageFetched {
                    target,
                    final_url,
                    page,
                }
            }
            Err(err) => {
                let error = err.to_page_error(&target.url);
                sink.emit(CrawlEvent::PageFailed {
                    url: target.url.clone(),
                    reason: error.reason.clone(),
                });
                Msg::PageFailed { target, error }
            }
        }
    }
}

/// Crawls with the default fetcher and extractor, without progress or cancellation.
pub async fn crawl(config: CrawlConfig) -> Result<CrawlResult, RunError> {
    let crawler = Crawler::from_config(&config)?;
    crawler
        .run(config, &CancellationToken::new(), &NullProgressSink)
        .await
}
