use std::collections::{HashSet, VecDeque};

use crawl_logging::crawl_trace;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_url;

/// A URL waiting to be fetched, with its link distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: usize,
}

/// Breadth-first work queue with at-most-once admission per normalized URL.
///
/// A URL is admitted once over the lifetime of the frontier: pushing it again
/// while it is pending, or after it has been popped, does nothing. Pushes
/// deeper than `max_depth`, or made once `max_pages` URLs have been admitted,
/// are dropped silently.
///
/// Redirect targets recorded with [`Frontier::mark_visited`] are never
/// admitted either, but do not use up a `max_pages` slot.
#[derive(Debug, Clone)]
pub struct Frontier {
    pending: VecDeque<CrawlTarget>,
    pending_keys: HashSet<String>,
    visited: HashSet<String>,
    aliases: HashSet<String>,
    max_pages: usize,
    max_depth: usize,
}

impl Frontier {
    pub fn new(max_pages: usize, max_depth: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            pending_keys: HashSet::new(),
            visited: HashSet::new(),
            aliases: HashSet::new(),
            max_pages,
            max_depth,
        }
    }

    /// Returns `true` if the URL was admitted.
    pub fn push(&mut self, url: &str, depth: usize) -> bool {
        if depth > self.max_depth {
            crawl_trace!("frontier: drop {url} (depth {depth} > {})", self.max_depth);
            return false;
        }
        let key = normalize_url(url);
        if self.visited.contains(&key)
            || self.aliases.contains(&key)
            || self.pending_keys.contains(&key)
        {
            return false;
        }
        if self.admitted() >= self.max_pages {
            crawl_trace!("frontier: drop {url} (page limit {})", self.max_pages);
            return false;
        }
        self.pending_keys.insert(key);
        self.pending.push_back(CrawlTarget {
            url: url.trim().to_string(),
            depth,
        });
        true
    }

    /// Takes the oldest pending target and marks it visited.
    pub fn pop(&mut self) -> Option<CrawlTarget> {
        let target = self.pending.pop_front()?;
        let key = normalize_url(&target.url);
        self.pending_keys.remove(&key);
        self.visited.insert(key);
        Some(target)
    }

    /// Number of pending targets.
    pub fn size(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of URLs ever admitted (visited plus pending).
    pub fn admitted(&self) -> usize {
        self.visited.len() + self.pending.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        let key = normalize_url(url);
        self.visited.contains(&key) || self.aliases.contains(&key)
    }

    /// Records `url` as fetched without it having been popped, as happens
    /// for the target of a redirect. A pending entry for it is dropped.
    ///
    /// Returns `false` if the URL had already been visited.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        let key = normalize_url(url);
        if self.visited.contains(&key) || self.aliases.contains(&key) {
            return false;
        }
        if self.pending_keys.remove(&key) {
            self.pending.retain(|target| normalize_url(&target.url) != key);
            self.visited.insert(key);
        } else {
            self.aliases.insert(key);
        }
        true
    }

    /// Discards every pending target without visiting it.
    pub fn clear_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.pending_keys.clear();
        dropped
    }
}
