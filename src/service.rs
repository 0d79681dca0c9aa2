use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Configuration;
use crate::detector::{DetectorStats, IngestReport, TrendDetector};
use crate::models::{NewsItem, TrendingTopic};

/// Cloneable async handle around one [`TrendDetector`]. Every call takes the
/// same fair `tokio::sync::Mutex`, so callers are served in arrival order.
#[derive(Debug, Clone)]
pub struct TrendService {
    inner: Arc<Mutex<TrendDetector>>,
}

impl Default for TrendService {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl From<TrendDetector> for TrendService {
    fn from(detector: TrendDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }
}

impl TrendService {
    pub fn new(config: Configuration) -> Self {
        TrendDetector::new(config).into()
    }

    pub async fn ingest(&self, items: Vec<NewsItem>) -> IngestReport {
        self.inner.lock().await.ingest(&items)
    }

    pub async fn ingest_at(&self, items: Vec<NewsItem>, now: DateTime<Utc>) -> IngestReport {
        self.inner.lock().await.ingest_at(&items, now)
    }

    pub async fn trending(&self, now: DateTime<Utc>) -> Vec<TrendingTopic> {
        self.inner.lock().await.trending(now)
    }

    pub async fn trending_now(&self) -> Vec<TrendingTopic> {
        self.inner.lock().await.trending_now()
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    pub async fn update_alias_map(&self, aliases: HashMap<String, String>) {
        self.inner.lock().await.update_alias_map(aliases);
    }

    pub async fn add_alias_mappings(&self, aliases: HashMap<String, String>) {
        self.inner.lock().await.add_alias_mappings(aliases);
    }

    pub async fn add_stopwords(&self, words: Vec<String>) {
        self.inner.lock().await.add_stopwords(words);
    }

    pub async fn remove_stopwords(&self, words: Vec<String>) {
        self.inner.lock().await.remove_stopwords(words);
    }

    pub async fn add_phrase_stopwords(&self, words: Vec<String>) {
        self.inner.lock().await.add_phrase_stopwords(words);
    }

    pub async fn remove_phrase_stopwords(&self, words: Vec<String>) {
        self.inner.lock().await.remove_phrase_stopwords(words);
    }

    pub async fn clear_dynamic_stopwords(&self) {
        self.inner.lock().await.clear_dynamic_stopwords();
    }

    pub async fn dynamic_stopwords(&self) -> Vec<String> {
        self.inner.lock().await.dynamic_stopwords()
    }

    pub async fn stats(&self) -> DetectorStats {
        self.inner.lock().await.stats()
    }

    pub async fn configuration(&self) -> Configuration {
        self.inner.lock().await.configuration().clone()
    }
}
