mod args;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crawl_logging::{crawl_error, crawl_warn, LogDestination};
use docmap_core::CrawlResult;
use docmap_engine::{export_result, Crawler, RunError};
use tokio_util::sync::CancellationToken;

use crate::args::Args;
use crate::progress::LogProgressSink;

const EXIT_PAGE_ERRORS: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    if !crawl_logging::initialize(destination, args.log_level()) {
        eprintln!("Warning: logging could not be initialized");
    }

    match run(&args).await {
        Ok(result) if !result.has_page_failures() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_PAGE_ERRORS),
        Err(err) => {
            crawl_error!("{err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(args: &Args) -> Result<CrawlResult> {
    let config = args.crawl_config()?;
    let crawler = Crawler::from_config(&config).context("setting up the crawler")?;

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let outcome = crawler.run(config, &cancel, &LogProgressSink).await;
    watcher.abort();
    let result = outcome.map_err(|err| match err {
        RunError::Config(err) => anyhow::Error::new(err).context("invalid crawl configuration"),
        RunError::Client(err) => anyhow::Error::new(err).context("building the http client"),
    })?;

    let summary = export_result(Path::new("."), &result, args.export_options())
        .context("writing crawl output")?;
    if summary.output_path.is_none() {
        print_tree(&result)?;
    }
    Ok(result)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            crawl_warn!("interrupt received, stopping after the current page");
            cancel.cancel();
        }
        Err(err) => crawl_warn!("cannot listen for Ctrl-C: {err}"),
    }
}

fn print_tree(result: &CrawlResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&result.tree)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("writing module tree to stdout")?;
    Ok(())
}
