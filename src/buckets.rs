use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::epoch_secs;

#[derive(Debug, Default, Clone)]
pub(crate) struct Bucket {
    pub term_counts: HashMap<String, u64>,
    pub term_title_counts: HashMap<String, u64>,
    pub term_sources: HashMap<String, HashSet<String>>,
    pub source_item_counts: HashMap<String, usize>,
}

impl Bucket {
    pub fn record_term(&mut self, term: &str, source: &str, from_title: bool) {
        *self.term_counts.entry(term.to_string()).or_insert(0) += 1;
        if from_title {
            *self.term_title_counts.entry(term.to_string()).or_insert(0) += 1;
        }
        self.term_sources
            .entry(term.to_string())
            .or_default()
            .insert(source.to_string());
    }

    /// Counts an item against its source. Returns false, leaving the counter
    /// untouched, once the source already holds `cap` items here.
    pub fn admit_source(&mut self, source: &str, cap: Option<usize>) -> bool {
        let count = self.source_item_counts.entry(source.to_string()).or_insert(0);
        match cap {
            Some(cap) if cap > 0 && *count >= cap => false,
            _ => {
                *count += 1;
                true
            }
        }
    }
}

/// Window boundaries, in epoch seconds, for one scoring pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Windows {
    pub short_start: f64,
    pub prev_short_start: f64,
    pub baseline_start: f64,
}

impl Windows {
    pub fn ending_at(now: DateTime<Utc>, short_secs: f64, baseline_secs: f64) -> Self {
        let now = epoch_secs(now);
        Self {
            short_start: now - short_secs,
            prev_short_start: now - 2.0 * short_secs,
            baseline_start: now - baseline_secs,
        }
    }
}

/// Per-term totals accumulated across the three windows.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct TermWindowCounts {
    pub short: u64,
    pub short_title: u64,
    pub prev_short: u64,
    pub prev_short_title: u64,
    pub baseline: u64,
    pub baseline_title: u64,
    pub short_sources: HashSet<String>,
}

#[derive(Debug)]
pub(crate) struct BucketStore {
    size_secs: f64,
    buckets: BTreeMap<i64, Bucket>,
}

impl BucketStore {
    pub fn new(size_secs: f64) -> Self {
        Self {
            size_secs: size_secs.max(1.0),
            buckets: BTreeMap::new(),
        }
    }

    pub fn key_for(&self, ts: DateTime<Utc>) -> i64 {
        (epoch_secs(ts) / self.size_secs).floor() as i64
    }

    pub fn start_of(&self, key: i64) -> f64 {
        key as f64 * self.size_secs
    }

    /// Bucket covering `ts`, created on first use.
    pub fn bucket_mut(&mut self, ts: DateTime<Utc>) -> &mut Bucket {
        let key = self.key_for(ts);
        self.buckets.entry(key).or_default()
    }

    /// Removes every bucket whose key is below the cutoff's key.
    pub fn expire(&mut self, cutoff: DateTime<Utc>) -> usize {
        let min_key = self.key_for(cutoff);
        let before = self.buckets.len();
        self.buckets = self.buckets.split_off(&min_key);
        before - self.buckets.len()
    }

    /// Folds retained buckets into short / previous-short / baseline totals.
    /// Only terms with a nonzero short-window count are returned.
    pub fn window_counts(&self, windows: &Windows) -> HashMap<String, TermWindowCounts> {
        let mut totals: HashMap<String, TermWindowCounts> = HashMap::new();

        for (&key, bucket) in &self.buckets {
            let start = self.start_of(key);
            if start < windows.baseline_start {
                continue;
            }
            let in_short = start >= windows.short_start;
            let in_prev_short = !in_short && start >= windows.prev_short_start;

            for (term, &count) in &bucket.term_counts {
                let title = bucket.term_title_counts.get(term).copied().unwrap_or(0);
                let entry = totals.entry(term.clone()).or_default();
                entry.baseline += count;
                entry.baseline_title += title;
                if in_short {
                    entry.short += count;
                    entry.short_title += title;
                } else if in_prev_short {
                    entry.prev_short += count;
                    entry.prev_short_title += title;
                }
            }

            if in_short {
                for (term, sources) in &bucket.term_sources {
                    totals
                        .entry(term.clone())
                        .or_default()
                        .short_sources
                        .extend(sources.iter().cloned());
                }
            }
        }

        totals.retain(|_, counts| counts.short > 0);
        totals
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    #[cfg(test)]
    pub fn keys(&self) -> Vec<i64> {
        self.buckets.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn keys_align_to_bucket_size() {
        let store = BucketStore::new(60.0);
        assert_eq!(store.key_for(at(119)), 1);
        assert_eq!(store.key_for(at(120)), 2);
        assert_eq!(store.start_of(2), 120.0);
        assert_eq!(BucketStore::new(0.0).key_for(at(7)), 7);
    }

    #[test]
    fn source_cap_blocks_after_limit() {
        let mut bucket = Bucket::default();
        assert!(bucket.admit_source("wire", Some(2)));
        assert!(bucket.admit_source("wire", Some(2)));
        assert!(!bucket.admit_source("wire", Some(2)));
        assert_eq!(bucket.source_item_counts["wire"], 2);
        assert!(bucket.admit_source("wire", None));
        assert!(bucket.admit_source("other", Some(0)));
    }

    #[test]
    fn expire_drops_old_buckets() {
        let mut store = BucketStore::new(60.0);
        store.bucket_mut(at(0)).record_term("a", "s", true);
        store.bucket_mut(at(600)).record_term("a", "s", true);
        store.bucket_mut(at(1200)).record_term("a", "s", true);
        assert_eq!(store.expire(at(630)), 1);
        assert_eq!(store.keys(), vec![10, 20]);
    }

    #[test]
    fn window_counts_split_by_window() {
        let now = at(10_000);
        let mut store = BucketStore::new(10.0);
        // baseline only
        store.bucket_mut(now - Duration::seconds(500)).record_term("storm", "a", false);
        // previous short window
        store.bucket_mut(now - Duration::seconds(150)).record_term("storm", "b", true);
        // short window
        store.bucket_mut(now - Duration::seconds(50)).record_term("storm", "c", true);
        store.bucket_mut(now - Duration::seconds(40)).record_term("storm", "d", false);
        store.bucket_mut(now - Duration::seconds(40)).record_term("quiet", "d", false);
        store.bucket_mut(now - Duration::seconds(500)).record_term("gone", "a", false);

        let windows = Windows::ending_at(now, 100.0, 1000.0);
        let counts = store.window_counts(&windows);

        let storm = &counts["storm"];
        assert_eq!(storm.short, 2);
        assert_eq!(storm.short_title, 1);
        assert_eq!(storm.prev_short, 1);
        assert_eq!(storm.prev_short_title, 1);
        assert_eq!(storm.baseline, 4);
        assert_eq!(storm.baseline_title, 2);
        assert_eq!(storm.short_sources.len(), 2);
        assert_eq!(counts["quiet"].short, 1);
        assert!(!counts.contains_key("gone"));
    }
}
