//! Streaming trend detection for news feeds.

mod buckets;
mod config;
mod dedupe;
mod detector;
mod extract;
mod ledger;
mod lexicon;
mod models;
mod render;
mod replay;
mod scoring;
mod service;
mod tokenize;

pub use config::{Configuration, Weights};
pub use detector::{DetectorStats, IngestReport, TrendDetector};
pub use lexicon::{
    default_phrase_stopwords, default_stopwords, DEFAULT_PHRASE_STOPWORDS, DEFAULT_STOPWORDS,
};
pub use models::{CaseStyle, NewsItem, TrendingTopic};
pub use render::{render_topics_markdown, render_topics_text};
pub use replay::{load_items, normalize_items, parse_items};
pub use service::TrendService;
