use crawl_logging::{crawl_info, crawl_warn};
use docmap_engine::{CrawlEvent, ProgressSink};

/// Reports crawl progress through the log.
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::PageStarted { url, depth } => {
                crawl_info!("fetching {url} (depth {depth})");
            }
            CrawlEvent::PageVisited {
                url,
                blocks,
                links,
                pages_visited,
            } => {
                crawl_info!("[{pages_visited}] {url}: {blocks} section(s), {links} link(s)");
            }
            CrawlEvent::PageFailed { url, reason } => {
                crawl_warn!("skipped {url}: {reason}");
            }
            CrawlEvent::Finished {
                pages_visited,
                errors,
                cancelled,
            } => {
                let status = if cancelled { "cancelled" } else { "finished" };
                crawl_info!("crawl {status}: {pages_visited} page(s), {errors} error(s)");
            }
        }
    }
}
