use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::buckets::{BucketStore, Windows};
use crate::config::{lowercase_map, Configuration};
use crate::dedupe::{DedupState, TtlMap};
use crate::extract::TermExtractor;
use crate::ledger::TermLedger;
use crate::models::{epoch_secs, from_epoch_secs, HeadlineSample, NewsItem, TrendingTopic};
use crate::scoring::Scorer;

/// Outcome of one `ingest` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub duplicates: usize,
    /// Dropped by the per-source bucket cap.
    pub capped: usize,
    /// Term occurrences recorded across accepted items.
    pub terms: usize,
    pub evicted_buckets: usize,
}

/// Sizes of the retained state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectorStats {
    pub buckets: usize,
    pub tracked_terms: usize,
    pub sample_pools: usize,
    pub dedup_urls: usize,
    pub dedup_titles: usize,
    pub dynamic_stopwords: usize,
}

/// Streaming trend detector over news items.
///
/// Not synchronized; wrap it in [`crate::TrendService`] to share it.
#[derive(Debug)]
pub struct TrendDetector {
    config: Configuration,
    buckets: BucketStore,
    ledger: TermLedger,
    dedup: DedupState,
    dynamic_stopwords: TtlMap<String>,
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl TrendDetector {
    pub fn new(config: Configuration) -> Self {
        let config = config.normalized();
        let buckets = BucketStore::new(config.effective_bucket_size());
        Self {
            config,
            buckets,
            ledger: TermLedger::default(),
            dedup: DedupState::default(),
            dynamic_stopwords: TtlMap::default(),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Ingests a batch, evicting relative to the wall clock afterwards.
    pub fn ingest(&mut self, items: &[NewsItem]) -> IngestReport {
        self.ingest_at(items, Utc::now())
    }

    pub fn ingest_one(&mut self, item: &NewsItem) -> IngestReport {
        self.ingest(std::slice::from_ref(item))
    }

    /// Ingests a batch, evicting relative to `now` afterwards. Items are
    /// bucketed by their own `published_at`, never by `now`.
    pub fn ingest_at(&mut self, items: &[NewsItem], now: DateTime<Utc>) -> IngestReport {
        let mut report = IngestReport::default();
        for item in items {
            self.ingest_item(item, &mut report);
        }
        report.evicted_buckets = self.expire(now);

        debug!(
            "Ingest completed - items={}, accepted={}, duplicates={}, capped={}, terms={}, evicted_buckets={}",
            items.len(),
            report.accepted,
            report.duplicates,
            report.capped,
            report.terms,
            report.evicted_buckets
        );
        report
    }

    fn ingest_item(&mut self, item: &NewsItem, report: &mut IngestReport) {
        let published = item.published_at;
        if self.config.enable_dedupe {
            let cutoff = self.cutoff(published);
            if self.dedup.check_and_record(item, cutoff) {
                report.duplicates += 1;
                return;
            }
        }

        let cap = self.config.max_items_per_source_per_bucket;
        if !self.buckets.bucket_mut(published).admit_source(&item.source, cap) {
            report.capped += 1;
            return;
        }

        let candidates = TermExtractor::new(&self.config, &self.dynamic_stopwords).extract(item);
        report.accepted += 1;
        report.terms += candidates.len();

        let sample_limit = self.config.sample_headline_limit;
        let bucket = self.buckets.bucket_mut(published);
        for candidate in candidates {
            bucket.record_term(&candidate.term, &item.source, candidate.from_title);
            let sample = HeadlineSample {
                headline: item.title.clone(),
                source: item.source.clone(),
                published_at: published,
            };
            self.ledger
                .observe(&candidate.term, candidate.case_style, sample, sample_limit);
        }
    }

    /// Ranked topics as of `now`. Also evicts stale state and learns
    /// background terms as dynamic stopwords.
    pub fn trending(&mut self, now: DateTime<Utc>) -> Vec<TrendingTopic> {
        let started = Instant::now();
        self.expire(now);
        self.ledger.prune(self.cutoff(now));

        let windows = Windows::ending_at(
            now,
            self.config.short_window_secs,
            self.config.baseline_window_secs,
        );
        let counts = self.buckets.window_counts(&windows);
        let ranking =
            Scorer::new(&self.config, &self.ledger, &self.dynamic_stopwords).rank(counts, now);

        for key in &ranking.learned_stopwords {
            self.dynamic_stopwords.touch(key.clone(), now);
        }
        if !ranking.learned_stopwords.is_empty() {
            info!(
                "Dynamic stopwords learned - count={}, terms={}",
                ranking.learned_stopwords.len(),
                ranking.learned_stopwords.join(", ")
            );
        }

        debug!(
            "Trending computed - buckets={}, candidates={}, topics={}, learned={}, duration={:.3}s",
            self.buckets.len(),
            ranking.candidates,
            ranking.topics.len(),
            ranking.learned_stopwords.len(),
            started.elapsed().as_secs_f32()
        );
        ranking.topics
    }

    pub fn trending_now(&mut self) -> Vec<TrendingTopic> {
        self.trending(Utc::now())
    }

    /// Forgets all observations. Configuration is kept.
    pub fn reset(&mut self) {
        self.buckets.clear();
        self.ledger.clear();
        self.dedup.clear();
        self.dynamic_stopwords.clear();
        debug!("Detector reset");
    }

    pub fn update_alias_map(&mut self, aliases: HashMap<String, String>) {
        self.config.alias_map = lowercase_map(aliases);
    }

    pub fn add_alias_mappings(&mut self, aliases: HashMap<String, String>) {
        self.config.alias_map.extend(lowercase_map(aliases));
    }

    pub fn add_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config
            .stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
    }

    pub fn remove_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.config.stopwords.remove(&word.as_ref().to_lowercase());
        }
    }

    pub fn add_phrase_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config
            .phrase_stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
    }

    pub fn remove_phrase_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.config.phrase_stopwords.remove(&word.as_ref().to_lowercase());
        }
    }

    /// Forgets learned stopwords only; configured ones stay.
    pub fn clear_dynamic_stopwords(&mut self) {
        self.dynamic_stopwords.clear();
    }

    /// Learned stopwords, sorted.
    pub fn dynamic_stopwords(&self) -> Vec<String> {
        let mut words: Vec<String> = self.dynamic_stopwords.keys().cloned().collect();
        words.sort();
        words
    }

    pub fn stats(&self) -> DetectorStats {
        let (dedup_urls, dedup_titles) = self.dedup.len();
        DetectorStats {
            buckets: self.buckets.len(),
            tracked_terms: self.ledger.tracked_terms(),
            sample_pools: self.ledger.sample_pools(),
            dedup_urls,
            dedup_titles,
            dynamic_stopwords: self.dynamic_stopwords.len(),
        }
    }

    fn cutoff(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        from_epoch_secs(epoch_secs(at) - self.config.baseline_window_secs)
    }

    fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = self.cutoff(now);
        let evicted = self.buckets.expire(cutoff);
        self.dedup.expire(cutoff);
        self.dynamic_stopwords.expire(cutoff);
        evicted
    }
}
