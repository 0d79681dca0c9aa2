use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Weights;

/// A single feed entry as handed over by the hosting process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub feed_id: String,
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub url: Url,
    pub published_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

/// One ranked entry of a [`crate::TrendDetector::trending`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub term: String,
    pub score: f64,
    pub short_count: u64,
    pub baseline_count: u64,
    pub unique_sources: usize,
    pub burst_z: f64,
    pub burst_ratio: f64,
    pub title_share: f64, // [0.0, 1.0]
    pub sample_headlines: Vec<String>,
    pub last_seen_at: DateTime<Utc>,
}

/// Most distinguished casing a term has been seen in. Ordered so that `max`
/// picks the stronger style.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CaseStyle {
    #[default]
    Normal,
    TitleCase,
    AllCaps,
}

impl CaseStyle {
    pub fn weight(self, weights: &Weights) -> f64 {
        match self {
            CaseStyle::AllCaps => weights.all_caps_weight,
            CaseStyle::TitleCase => weights.title_case_weight,
            CaseStyle::Normal => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeadlineSample {
    pub headline: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

/// Seconds since the epoch with sub-second precision; all window arithmetic
/// runs on this scale.
pub(crate) fn epoch_secs(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_micros() as f64 / 1_000_000.0
}

pub(crate) fn from_epoch_secs(secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_styles_order_by_strength() {
        assert!(CaseStyle::Normal < CaseStyle::TitleCase);
        assert!(CaseStyle::TitleCase < CaseStyle::AllCaps);
        assert_eq!(CaseStyle::Normal.max(CaseStyle::AllCaps), CaseStyle::AllCaps);
    }

    #[test]
    fn case_weight_follows_style() {
        let w = Weights::default();
        assert_eq!(CaseStyle::Normal.weight(&w), 1.0);
        assert_eq!(CaseStyle::TitleCase.weight(&w), w.title_case_weight);
        assert_eq!(CaseStyle::AllCaps.weight(&w), w.all_caps_weight);
    }

    #[test]
    fn topic_survives_json_round_trip() {
        let topic = TrendingTopic {
            term: "united states".into(),
            score: 3.141_592_653_589_793,
            short_count: 7,
            baseline_count: 19,
            unique_sources: 4,
            burst_z: 1.0 / 3.0,
            burst_ratio: 2.718_281_828_459_045,
            title_share: 0.571_428_571_428_571_4,
            sample_headlines: vec!["A headline".into(), "Another one".into()],
            last_seen_at: DateTime::from_timestamp_micros(1_760_000_000_123_456).unwrap(),
        };
        let encoded = serde_json::to_string(&topic).unwrap();
        let decoded: TrendingTopic = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, topic);
    }

    #[test]
    fn epoch_conversion_keeps_micros() {
        let ts = DateTime::from_timestamp_micros(1_700_000_000_250_000).unwrap();
        assert_eq!(from_epoch_secs(epoch_secs(ts)), ts);
    }
}
