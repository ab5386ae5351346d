use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_trace};
use docmap_core::{CrawlConfig, ScopeFilter};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Minimum wall-clock gap between the starts of two requests.
    pub request_delay: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    /// Redirects to other hosts are not followed. Empty means no restriction.
    pub allowed_domains: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            request_delay: Duration::ZERO,
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            allowed_domains: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchSettings {
    pub fn from_config(config: &CrawlConfig) -> Self {
        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        Self {
            connect_timeout: request_timeout.min(Duration::from_secs(10)),
            request_timeout,
            request_delay: Duration::from_millis(config.request_delay_ms),
            allowed_domains: config.allowed_domains.iter().cloned().collect(),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
            ..Self::default()
        }
    }
}

fn default_user_agent() -> String {
    format!("docmap/{}", env!("CARGO_PKG_VERSION"))
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// Delay gate acquired before every request of one fetcher.
///
/// The lock is held while sleeping, so concurrent callers are released one at
/// a time, each at least `min_delay` after the previous one.
#[derive(Debug)]
pub struct PolitenessGate {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PolitenessGate {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            if ready_at > Instant::now() {
                crawl_trace!("politeness gate: waiting {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[derive(Debug)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
    gate: PolitenessGate,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(redirect_policy(
                settings.redirect_limit,
                &settings.allowed_domains,
            ))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let gate = PolitenessGate::new(settings.request_delay);
        Ok(Self {
            settings,
            client,
            gate,
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        // The gate is passed before validation so that every call, failed or
        // not, spaces out the next one.
        self.gate.acquire().await;

        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        // Only redirects the policy refused to follow arrive here.
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());
        if let (true, Some(location)) = (status.is_redirection(), location) {
            return Err(FetchError::new(
                FailureKind::RedirectOutOfScope {
                    status: status.as_u16(),
                    location: location.to_string(),
                },
                "redirect leaves the allowed domains",
            ));
        }
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "not an html page",
                ));
            }
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }
}

/// Follows up to `limit` redirects, stopping (and returning the 3xx
/// response) at the first one that leaves `allowed_domains`.
fn redirect_policy(limit: usize, allowed_domains: &[String]) -> Policy {
    let scope = (!allowed_domains.is_empty()).then(|| ScopeFilter::new(allowed_domains));
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= limit {
            return attempt.error("redirect limit exceeded");
        }
        match &scope {
            Some(scope) if !scope.is_in_scope(attempt.url().as_str()) => {
                crawl_debug!("not following redirect to {}", attempt.url());
                attempt.stop()
            }
            _ => attempt.follow(),
        }
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
