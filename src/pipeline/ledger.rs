//! Seen-article ledger.
//!
//! Bounded FIFO of article URLs already surfaced to the user, so later
//! fetches can skip them. Insertion order is the only order: seeing a URL
//! again does not refresh it, and the oldest entries go first when the
//! ledger is full.

use crate::config::SEEN_LEDGER_CAPACITY;
use crate::error::Result;
use crate::models::is_real_url;
use crate::storage::Storage;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug)]
pub struct HistoryLedger {
    urls: VecDeque<String>,
    capacity: usize,
    storage: Option<Storage>,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(SEEN_LEDGER_CAPACITY)
    }
}

impl HistoryLedger {
    /// Ledger that lives only as long as the process.
    pub fn new(capacity: usize) -> Self {
        Self {
            urls: VecDeque::with_capacity(capacity),
            capacity,
            storage: None,
        }
    }

    /// Ledger backed by `storage`; loads what earlier sessions recorded.
    pub fn load(storage: Storage) -> Self {
        let mut ledger = Self::new(SEEN_LEDGER_CAPACITY);
        ledger.urls.extend(storage.seen_urls());
        ledger.evict();
        ledger.storage = Some(storage);
        ledger
    }

    /// Placeholder URLs are never recorded, so they are always new.
    pub fn is_new(&self, url: &str) -> bool {
        !is_real_url(url) || !self.urls.iter().any(|u| u == url)
    }

    /// Append unseen URLs, evict the oldest past capacity, then persist.
    pub fn record_seen<S: AsRef<str>>(&mut self, urls: &[S]) -> Result<()> {
        let mut known: HashSet<String> = self.urls.iter().cloned().collect();
        for url in urls {
            let url = url.as_ref();
            if is_real_url(url) && known.insert(url.to_string()) {
                self.urls.push_back(url.to_string());
            }
        }
        self.evict();
        debug!(size = self.urls.len(), "Updated seen ledger");

        if let Some(storage) = &self.storage {
            storage.save_seen_urls(&self.urls())?;
        }
        Ok(())
    }

    fn evict(&mut self) {
        while self.urls.len() > self.capacity {
            self.urls.pop_front();
        }
    }

    /// Oldest first.
    pub fn urls(&self) -> Vec<String> {
        self.urls.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(n: usize) -> String {
        format!("https://www.autohome.com.cn/news/{n}.html")
    }

    #[test]
    fn test_bound_keeps_most_recent() {
        let mut ledger = HistoryLedger::default();
        let all: Vec<String> = (0..150).map(url).collect();
        for chunk in all.chunks(7) {
            ledger.record_seen(chunk).unwrap();
        }
        assert_eq!(ledger.len(), 100);
        assert_eq!(ledger.urls(), all[50..].to_vec());
        assert!(ledger.is_new(&url(49)));
        assert!(!ledger.is_new(&url(50)));
    }

    #[test]
    fn test_reseen_url_does_not_refresh_position() {
        let mut ledger = HistoryLedger::new(3);
        ledger.record_seen(&[url(1), url(2), url(3)]).unwrap();
        ledger.record_seen(&[url(1)]).unwrap();
        ledger.record_seen(&[url(4)]).unwrap();
        // url(1) was the oldest insertion and goes first despite being re-seen
        assert_eq!(ledger.urls(), vec![url(2), url(3), url(4)]);
    }

    #[test]
    fn test_placeholders_are_never_recorded() {
        let mut ledger = HistoryLedger::new(10);
        ledger.record_seen(&["#", "", "https://a.com/1"]).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_new("#"));
    }

    #[test]
    fn test_duplicates_within_one_call() {
        let mut ledger = HistoryLedger::new(10);
        ledger.record_seen(&[url(1), url(1)]).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_persists_across_sessions() {
        let storage = Storage::in_memory();
        {
            let mut ledger = HistoryLedger::load(storage.clone());
            ledger.record_seen(&[url(1), url(2)]).unwrap();
        }
        let reloaded = HistoryLedger::load(storage);
        assert!(!reloaded.is_new(&url(1)));
        assert!(reloaded.is_new(&url(3)));
    }
}
