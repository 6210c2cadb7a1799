//! Bounded cache of first result pages, keyed by query.

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::federated::ComposedPage;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    page: ComposedPage,
    last_used: u64,
}

/// Least-recently-used cache of page-1 results.
///
/// Keys are trimmed and case-folded, so `" Dune"` and `"dune"` share an entry.
/// A capacity of zero disables caching entirely.
#[derive(Debug, Clone)]
pub struct QueryCache {
    capacity: usize,
    entries: HashMap<String, Entry>,
    tick: u64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            tick: 0,
        }
    }

    /// Normalized cache key for a query.
    pub fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Look up a query, marking it as recently used.
    pub fn get(&mut self, query: &str) -> Option<&ComposedPage> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(&Self::key(query))?;
        entry.last_used = tick;
        Some(&entry.page)
    }

    /// Look up a query without touching recency.
    pub fn peek(&self, query: &str) -> Option<&ComposedPage> {
        self.entries.get(&Self::key(query)).map(|e| &e.page)
    }

    /// Store the first page for a query, evicting the least recently used
    /// entry when full.
    pub fn put(&mut self, query: &str, page: ComposedPage) {
        if self.capacity == 0 {
            return;
        }

        let key = Self::key(query);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        self.tick += 1;
        self.entries.insert(
            key,
            Entry {
                page,
                last_used: self.tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federated::{GutendexBook, RawRecord, UnifiedBook};

    fn page(id: &str) -> ComposedPage {
        ComposedPage::new(vec![UnifiedBook::new(
            id,
            "Title",
            RawRecord::Gutenberg(GutendexBook::default()),
        )
        .with_cover("https://covers.test/c.jpg")])
    }

    #[test]
    fn test_keys_are_trimmed_and_case_folded() {
        let mut cache = QueryCache::new(4);
        cache.put("  Science Fiction ", page("1"));

        assert_eq!(cache.get("science fiction"), Some(&page("1")));
        assert!(cache.peek("SCIENCE FICTION").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let mut cache = QueryCache::new(2);
        cache.put("dune", page("1"));
        cache.put("Dune", page("2"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("dune"), Some(&page("2")));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = QueryCache::new(2);
        cache.put("a", page("a"));
        cache.put("b", page("b"));

        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a").is_some());
        cache.put("c", page("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.peek("a").is_some());
        assert!(cache.peek("b").is_none());
        assert!(cache.peek("c").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = QueryCache::new(0);
        cache.put("dune", page("1"));
        assert!(cache.is_empty());
        assert!(cache.get("dune").is_none());
    }

    #[test]
    fn test_clear() {
        let mut cache = QueryCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        cache.put("dune", page("1"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
