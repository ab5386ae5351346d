use std::collections::HashSet;

use url::Url;

/// Decides whether a discovered link may be followed.
///
/// A URL is in scope when its scheme is http or https and its host equals one
/// of the allowed domains. Subdomains are not implied and ports are ignored.
/// Anything that fails to parse is out of scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    allowed: HashSet<String>,
}

impl ScopeFilter {
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed_domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn is_in_scope(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        parsed
            .host_str()
            .map(|host| self.allowed.contains(&host.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

pub fn is_in_scope<S: AsRef<str>>(url: &str, allowed_domains: &[S]) -> bool {
    ScopeFilter::new(allowed_domains).is_in_scope(url)
}

/// True when the last path segment ends in one of `extensions` (lower-case, no dot).
pub fn has_skipped_extension(url: &str, extensions: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let Some(segment) = parsed.path_segments().and_then(|mut segs| segs.next_back()) else {
        return false;
    };
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|skip| *skip == ext)
        }
        _ => false,
    }
}
