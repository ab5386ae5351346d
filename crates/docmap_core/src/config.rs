use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::scope::ScopeFilter;

pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Parameters of one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Page the crawl starts from.
    pub seed_url: String,
    /// Further start pages, crawled after the seed at depth 0.
    pub extra_seeds: Vec<String>,
    /// Hosts the crawl may follow links into (exact match).
    pub allowed_domains: BTreeSet<String>,
    pub max_pages: usize,
    pub max_depth: usize,
    pub request_delay_ms: u64,
    pub request_timeout_ms: u64,
    /// Links whose last path segment ends in one of these extensions are never fetched.
    pub skip_extensions: Vec<String>,
    /// CSS selectors tried in order to find the main content region of a page.
    pub content_selectors: Vec<String>,
    /// Drop leaf modules that carry no description.
    pub prune_empty_modules: bool,
    pub user_agent: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            extra_seeds: Vec::new(),
            allowed_domains: BTreeSet::new(),
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            skip_extensions: default_skip_extensions(),
            content_selectors: default_content_selectors(),
            prune_empty_modules: false,
            user_agent: None,
        }
    }
}

impl CrawlConfig {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Self::default()
        }
    }

    pub fn with_allowed_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_domains.insert(domain.into());
        self
    }

    /// Checks everything that must hold before the first request is made.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.allowed_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(ConfigError::NoAllowedDomains);
        }
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroMaxPages);
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let scope = ScopeFilter::new(self.allowed_domains.iter());
        let mut seeds = Vec::with_capacity(1 + self.extra_seeds.len());
        for raw in std::iter::once(&self.seed_url).chain(self.extra_seeds.iter()) {
            let seed = parse_seed(raw)?;
            if !scope.is_in_scope(seed.as_str()) {
                return Err(ConfigError::SeedOutOfScope(raw.trim().to_string()));
            }
            seeds.push(seed);
        }

        let root_name = seeds
            .first()
            .and_then(|seed| seed.host_str())
            .unwrap_or_default()
            .to_string();

        Ok(ValidatedConfig {
            seeds,
            root_name,
            scope,
            skip_extensions: self
                .skip_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            prune_empty_modules: self.prune_empty_modules,
        })
    }
}

/// Configuration that passed validation; consumed by the run state.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub seeds: Vec<Url>,
    /// Name given to the synthetic root module (the first seed's host).
    pub root_name: String,
    pub scope: ScopeFilter,
    pub skip_extensions: Vec<String>,
    pub max_pages: usize,
    pub max_depth: usize,
    pub prune_empty_modules: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid seed url '{url}': {message}")]
    InvalidSeedUrl { url: String, message: String },
    #[error("seed url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("no allowed domains configured")]
    NoAllowedDomains,
    #[error("seed url '{0}' is outside the allowed domains")]
    SeedOutOfScope(String),
    #[error("max_pages must be at least 1")]
    ZeroMaxPages,
    #[error("request_timeout_ms must be at least 1")]
    ZeroTimeout,
}

fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidSeedUrl {
        url: trimmed.to_string(),
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidSeedUrl {
            url: trimmed.to_string(),
            message: "missing host".into(),
        });
    }
    url.set_fragment(None);
    Ok(url)
}

pub fn default_skip_extensions() -> Vec<String> {
    ["pdf", "zip", "png", "jpg", "jpeg", "gif", "svg", "gz"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub fn default_content_selectors() -> Vec<String> {
    [
        "article.md-content__inner",
        "div.md-content",
        "main",
        "article",
        "[role=\"main\"]",
    ]
    .iter()
    .map(|sel| sel.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_domains_rejected_before_seed_is_parsed() {
        let config = CrawlConfig::new("not a url");
        assert_eq!(config.validate().unwrap_err(), ConfigError::NoAllowedDomains);
    }

    #[test]
    fn unparsable_seed_rejected() {
        let config = CrawlConfig::new("::nope").with_allowed_domain("docs.example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSeedUrl { .. })
        ));
    }

    #[test]
    fn ftp_seed_rejected() {
        let config =
            CrawlConfig::new("ftp://docs.example.com/").with_allowed_domain("docs.example.com");
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::UnsupportedScheme("ftp://docs.example.com/".into())
        );
    }

    #[test]
    fn seed_outside_scope_rejected() {
        let config =
            CrawlConfig::new("https://other.example.com/").with_allowed_domain("docs.example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SeedOutOfScope(_))
        ));
    }

    #[test]
    fn root_name_is_seed_host_and_extensions_normalized() {
        let mut config =
            CrawlConfig::new("https://Docs.Example.com/guide").with_allowed_domain("docs.example.com");
        config.skip_extensions = vec![".PDF".into(), "".into(), "zip".into()];
        let validated = config.validate().unwrap();
        assert_eq!(validated.root_name, "docs.example.com");
        assert_eq!(validated.skip_extensions, vec!["pdf", "zip"]);
        assert_eq!(validated.seeds.len(), 1);
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config =
            CrawlConfig::new("https://docs.example.com/").with_allowed_domain("docs.example.com");
        config.request_timeout_ms = 0;
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroTimeout);

        config.request_timeout_ms = 1;
        config.max_pages = 0;
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroMaxPages);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: CrawlConfig = serde_json::from_str(
            r#"{"seed_url":"https://docs.example.com","allowed_domains":["docs.example.com"]}"#,
        )
        .unwrap();
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.request_delay_ms, DEFAULT_REQUEST_DELAY_MS);
        assert_eq!(config.content_selectors, default_content_selectors());
    }
}
