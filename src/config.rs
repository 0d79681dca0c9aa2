use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::lexicon::{default_phrase_stopwords, default_stopwords};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub burst_weight: f64,
    pub count_weight: f64,
    pub accel_weight: f64,
    pub source_weight: f64,
    pub title_case_weight: f64,
    pub all_caps_weight: f64,
    pub title_token_weight: f64,
    pub body_token_weight: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            burst_weight: 1.0,
            count_weight: 0.6,
            accel_weight: 0.2,
            source_weight: 0.3,
            title_case_weight: 1.25,
            all_caps_weight: 1.5,
            title_token_weight: 1.0,
            body_token_weight: 0.6,
        }
    }
}

impl Weights {
    /// Title and body occurrences scaled by their position weights.
    pub fn weighted_count(&self, total: u64, title: u64) -> f64 {
        let title = title.min(total);
        title as f64 * self.title_token_weight + (total - title) as f64 * self.body_token_weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Recent interval compared against the baseline, in seconds.
    pub short_window_secs: f64,
    /// Retention and reference interval, in seconds.
    pub baseline_window_secs: f64,
    pub bucket_size_secs: f64,

    pub max_terms_per_item: usize,
    pub select_top_terms_per_item: bool,
    pub min_token_length: usize,
    pub enable_bigrams: bool,
    pub enable_trigrams: bool,
    pub enable_title_case_phrases: bool,
    pub allow_numeric_tokens: bool,
    /// Body text beyond this many characters is ignored.
    pub summary_max_length: usize,

    pub stopwords: HashSet<String>,
    pub banned_terms: HashSet<String>,
    pub alias_map: HashMap<String, String>,
    pub filter_stopwords_in_phrases: bool,
    pub phrase_stopwords: HashSet<String>,

    pub enable_dedupe: bool,
    pub max_items_per_source_per_bucket: Option<usize>,

    pub min_short_count: usize,
    pub min_unique_sources: usize,
    /// Falls back to `max(min_short_count, 3)`.
    pub lowercase_min_short_count: Option<usize>,
    /// Falls back to `min_unique_sources`.
    pub lowercase_min_unique_sources: Option<usize>,

    pub enable_dynamic_stopwords: bool,
    pub dynamic_stopword_baseline_min: u64,
    pub dynamic_stopword_burst_z_max: f64,
    pub dynamic_stopword_burst_ratio_max: f64,
    pub dynamic_stopword_min_sources: usize,

    pub weights: Weights,
    pub topic_limit: usize,
    pub sample_headline_limit: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            short_window_secs: 15.0 * 60.0,
            baseline_window_secs: 6.0 * 60.0 * 60.0,
            bucket_size_secs: 60.0,
            max_terms_per_item: 40,
            select_top_terms_per_item: false,
            min_token_length: 3,
            enable_bigrams: true,
            enable_trigrams: false,
            enable_title_case_phrases: true,
            allow_numeric_tokens: false,
            summary_max_length: 500,
            stopwords: default_stopwords(),
            banned_terms: HashSet::new(),
            alias_map: HashMap::new(),
            filter_stopwords_in_phrases: false,
            phrase_stopwords: default_phrase_stopwords(),
            enable_dedupe: true,
            max_items_per_source_per_bucket: Some(5),
            min_short_count: 2,
            min_unique_sources: 2,
            lowercase_min_short_count: None,
            lowercase_min_unique_sources: None,
            enable_dynamic_stopwords: true,
            dynamic_stopword_baseline_min: 12,
            dynamic_stopword_burst_z_max: 0.35,
            dynamic_stopword_burst_ratio_max: 1.2,
            dynamic_stopword_min_sources: 3,
            weights: Weights::default(),
            topic_limit: 30,
            sample_headline_limit: 5,
        }
    }
}

impl Configuration {
    /// Reads a (possibly partial) JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading configuration {}", path.display()))?;
        let cfg: Configuration = serde_json::from_str(&raw)
            .with_context(|| format!("Decoding configuration {}", path.display()))?;
        debug!(
            "Configuration loaded - path={}, short={}s, baseline={}s, bucket={}s",
            path.display(),
            cfg.short_window_secs,
            cfg.baseline_window_secs,
            cfg.bucket_size_secs
        );
        Ok(cfg)
    }

    /// Lowercases every word set and both sides of the alias map.
    pub fn normalized(mut self) -> Self {
        self.stopwords = lowercase_set(self.stopwords);
        self.banned_terms = lowercase_set(self.banned_terms);
        self.phrase_stopwords = lowercase_set(self.phrase_stopwords);
        self.alias_map = lowercase_map(self.alias_map);
        self
    }

    pub fn lowercase_min_short_count(&self) -> usize {
        self.lowercase_min_short_count
            .unwrap_or_else(|| self.min_short_count.max(3))
    }

    pub fn lowercase_min_unique_sources(&self) -> usize {
        self.lowercase_min_unique_sources
            .unwrap_or(self.min_unique_sources)
    }

    /// Bucket width, floored at one second so key arithmetic never divides by zero.
    pub fn effective_bucket_size(&self) -> f64 {
        self.bucket_size_secs.max(1.0)
    }
}

pub(crate) fn lowercase_set(words: impl IntoIterator<Item = String>) -> HashSet<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}

pub(crate) fn lowercase_map(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter()
        .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
        .collect()
}
