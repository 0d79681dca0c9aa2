use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use xxhash_rust::xxh3::xxh3_64;

use crate::models::NewsItem;

/// Key -> last-seen timestamp, expired by cutoff.
#[derive(Debug, Clone)]
pub(crate) struct TtlMap<K> {
    entries: HashMap<K, DateTime<Utc>>,
}

impl<K> Default for TtlMap<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> TtlMap<K> {
    /// Stores `at`, keeping the later timestamp when the key already exists.
    pub fn touch(&mut self, key: K, at: DateTime<Utc>) {
        let slot = self.entries.entry(key).or_insert(at);
        if at > *slot {
            *slot = at;
        }
    }

    pub fn seen_since(&self, key: &K, cutoff: DateTime<Utc>) -> bool {
        self.entries.get(key).is_some_and(|seen| *seen >= cutoff)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Drops entries older than `cutoff`, returning how many went.
    pub fn expire(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, seen| *seen >= cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}

/// Remembers URLs and normalized titles of accepted items.
///
/// Keys are stored as xxh3 digests of the normalized strings.
#[derive(Debug, Default)]
pub(crate) struct DedupState {
    urls: TtlMap<u64>,
    titles: TtlMap<u64>,
}

impl DedupState {
    /// True when the item was already seen within `[cutoff, published_at]`;
    /// otherwise records its keys at `published_at`.
    pub fn check_and_record(&mut self, item: &NewsItem, cutoff: DateTime<Utc>) -> bool {
        let url_key = url_key(item);
        let title_key = title_key(&item.title);
        if self.urls.seen_since(&url_key, cutoff) || self.titles.seen_since(&title_key, cutoff) {
            return true;
        }
        self.urls.touch(url_key, item.published_at);
        self.titles.touch(title_key, item.published_at);
        false
    }

    pub fn expire(&mut self, cutoff: DateTime<Utc>) -> usize {
        self.urls.expire(cutoff) + self.titles.expire(cutoff)
    }

    pub fn clear(&mut self) {
        self.urls.clear();
        self.titles.clear();
    }

    pub fn len(&self) -> (usize, usize) {
        (self.urls.len(), self.titles.len())
    }
}

fn url_key(item: &NewsItem) -> u64 {
    xxh3_64(item.url.as_str().to_lowercase().as_bytes())
}

pub(crate) fn title_key(title: &str) -> u64 {
    xxh3_64(normalize_title(title).as_bytes())
}

pub(crate) fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
