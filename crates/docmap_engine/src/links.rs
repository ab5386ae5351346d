use std::collections::HashSet;

use crawl_logging::crawl_debug;
use url::Url;

const DEFAULT_MAX_LINKS: usize = 5_000;

/// Collects absolute, fragment-free hyperlink targets in first-seen order.
#[derive(Debug)]
pub(crate) struct LinkCollector {
    base_url: Option<Url>,
    seen: HashSet<String>,
    links: Vec<String>,
    max_links: usize,
}

impl LinkCollector {
    pub(crate) fn new(page_url: &str) -> Self {
        Self::with_max_links(page_url, DEFAULT_MAX_LINKS)
    }

    pub(crate) fn with_max_links(page_url: &str, max_links: usize) -> Self {
        Self {
            base_url: Url::parse(page_url).ok(),
            seen: HashSet::new(),
            links: Vec::new(),
            max_links,
        }
    }

    pub(crate) fn add(&mut self, href: &str) {
        if self.links.len() >= self.max_links {
            return;
        }
        let Some(url) = resolve_url(href, self.base_url.as_ref()) else {
            return;
        };
        let url: String = url.into();
        if self.seen.insert(url.clone()) {
            self.links.push(url);
        }
    }

    pub(crate) fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Resolves `reference` against `base`, dropping the fragment.
///
/// Returns `None` for in-page anchors, script/mail/phone links and anything
/// that cannot be resolved.
pub(crate) fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }
    let resolved = match base {
        Some(base) => base.join(trimmed),
        None => Url::parse(trimmed),
    };
    match resolved {
        Ok(mut url) => {
            url.set_fragment(None);
            Some(url)
        }
        Err(err) => {
            crawl_debug!("skipping unresolvable link '{trimmed}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    #[test]
    fn relative_links_resolve_against_page() {
        let url = resolve_url("../api/", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/api/");
        let url = resolve_url("setup", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/guide/setup");
    }

    #[test]
    fn fragments_are_stripped() {
        let url = resolve_url("/reference#section-2", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/reference");
    }

    #[test]
    fn special_links_are_skipped() {
        for href in ["#top", "", "  ", "javascript:void(0)", "mailto:a@b.c", "tel:123", "data:,x"] {
            assert_eq!(resolve_url(href, Some(&base())), None, "{href:?}");
        }
    }

    #[test]
    fn absolute_links_work_without_base() {
        let url = resolve_url("https://other.example.com/x#y", None).unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
        assert_eq!(resolve_url("relative/only", None), None);
    }

    #[test]
    fn collector_dedupes_after_fragment_removal_and_caps() {
        let mut collector = LinkCollector::with_max_links("https://docs.example.com/", 2);
        collector.add("/a#one");
        collector.add("/a#two");
        collector.add("https://docs.example.com/a");
        collector.add("/b");
        collector.add("/c");
        assert_eq!(
            collector.into_links(),
            vec!["https://docs.example.com/a", "https://docs.example.com/b"]
        );
    }
}
