//! Docmap engine: HTTP fetching, HTML extraction and the crawl driver.
mod crawler;
mod decode;
mod export;
mod extract;
mod fetch;
mod links;
mod persist;
mod types;

pub use crawler::{crawl, Crawler, NullProgressSink, ProgressSink, RunError};
pub use decode::{decode_html, DecodedHtml};
pub use export::{
    export_result, CrawlReport, ExportError, ExportOptions, ExportSummary,
    DEFAULT_OUTPUT_FILENAME, DEFAULT_REPORT_FILENAME,
};
pub use extract::{ContentExtractor, ExtractSettings, HeadingExtractor};
pub use fetch::{FetchSettings, Fetcher, PolitenessGate, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{CrawlEvent, FailureKind, FetchError, FetchMetadata, FetchOutput};
