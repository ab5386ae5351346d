use std::path::{Path, PathBuf};

use crawl_logging::crawl_info;
use docmap_core::{CrawlResult, PageError};
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

pub const DEFAULT_OUTPUT_FILENAME: &str = "extracted_modules.json";
pub const DEFAULT_REPORT_FILENAME: &str = "crawl_report.json";

/// Output locations, resolved against the export directory. Absolute paths
/// are used as given.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Receives the module tree alone; skipped when `None`.
    pub output_path: Option<PathBuf>,
    /// Receives visit count, errors and the cancellation flag; skipped when `None`.
    pub report_path: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: Some(PathBuf::from(DEFAULT_OUTPUT_FILENAME)),
            report_path: Some(PathBuf::from(DEFAULT_REPORT_FILENAME)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub module_count: usize,
    pub error_count: usize,
    pub output_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Summary written next to the tree.
#[derive(Debug, Serialize)]
pub struct CrawlReport<'a> {
    pub root: &'a str,
    pub pages_visited: usize,
    pub module_count: usize,
    pub cancelled: bool,
    pub errors: &'a [PageError],
}

impl<'a> CrawlReport<'a> {
    pub fn new(result: &'a CrawlResult) -> Self {
        Self {
            root: &result.tree.name,
            pages_visited: result.pages_visited,
            module_count: result.tree.descendant_count(),
            cancelled: result.cancelled,
            errors: &result.errors,
        }
    }
}

/// Writes the tree and the report to the locations in `options`.
pub fn export_result(
    output_dir: &Path,
    result: &CrawlResult,
    options: ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let report = CrawlReport::new(result);

    let output_path = match options.output_path {
        Some(path) => {
            let written = write_json_at(&output_dir.join(path), &result.tree)?;
            crawl_info!(
                "exported {} modules to {}",
                report.module_count,
                written.display()
            );
            Some(written)
        }
        None => None,
    };
    let report_path = match options.report_path {
        Some(path) => {
            let written = write_json_at(&output_dir.join(path), &report)?;
            crawl_info!("report written to {}", written.display());
            Some(written)
        }
        None => None,
    };

    Ok(ExportSummary {
        module_count: report.module_count,
        error_count: result.errors.len(),
        output_path,
        report_path,
    })
}

fn write_json_at<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, PersistError> {
    let (writer, name) = AtomicFileWriter::for_path(path)?;
    writer.write_json(&name, value)
}
