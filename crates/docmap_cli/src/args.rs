//! Command-line surface of the `docmap` binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use docmap_core::CrawlConfig;
use docmap_engine::ExportOptions;
use log::LevelFilter;
use url::Url;

/// Crawl a documentation site and infer its module hierarchy from headings.
#[derive(Parser, Debug)]
#[command(name = "docmap", version, about)]
pub struct Args {
    /// Page the crawl starts from (may come from --config instead)
    pub seed_url: Option<String>,

    /// Additional start page; repeatable
    #[arg(long = "seed", value_name = "URL")]
    pub extra_seeds: Vec<String>,

    /// Host the crawl may follow links into; repeatable. Defaults to the seed hosts
    #[arg(short = 'd', long = "allow-domain", value_name = "HOST")]
    pub allowed_domains: Vec<String>,

    #[arg(long, value_name = "N")]
    pub max_pages: Option<usize>,

    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Minimum pause between two requests
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Per-request timeout
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// JSON crawl configuration; flags given on the command line win
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to write the module tree (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Where to write the crawl report (visit count and page errors)
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Drop leaf modules without a description
    #[arg(long)]
    pub prune_empty: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// -v for debug output, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Tree and report destinations; the tree goes to stdout when `--output` is absent.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            output_path: self.output.clone(),
            report_path: self.report.clone(),
        }
    }

    /// Merges the optional config file with the command-line flags.
    pub fn crawl_config(&self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => CrawlConfig::default(),
        };

        if let Some(seed) = &self.seed_url {
            config.seed_url = seed.clone();
        }
        if config.seed_url.trim().is_empty() {
            bail!("no seed url given (pass SEED_URL or set seed_url in --config)");
        }
        config.extra_seeds.extend(self.extra_seeds.iter().cloned());
        config
            .allowed_domains
            .extend(self.allowed_domains.iter().map(|d| d.trim().to_string()));

        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if self.prune_empty {
            config.prune_empty_modules = true;
        }

        if config.allowed_domains.is_empty() {
            let seeds = std::iter::once(&config.seed_url).chain(config.extra_seeds.iter());
            let hosts: Vec<String> = seeds.filter_map(|seed| seed_host(seed)).collect();
            config.allowed_domains.extend(hosts);
        }
        Ok(config)
    }
}

fn load_config_file(path: &Path) -> Result<CrawlConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

fn seed_host(seed: &str) -> Option<String> {
    Url::parse(seed.trim())
        .ok()?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}
