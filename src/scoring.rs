use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashMap;

use crate::buckets::TermWindowCounts;
use crate::config::Configuration;
use crate::dedupe::TtlMap;
use crate::ledger::TermLedger;
use crate::models::{CaseStyle, TrendingTopic};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Verdict {
    Rejected,
    /// Background noise; carries the lowercase key to flag.
    Suppressed(String),
    Topic(TrendingTopic),
}

#[derive(Debug, Default)]
pub(crate) struct Ranking {
    pub topics: Vec<TrendingTopic>,
    pub learned_stopwords: Vec<String>,
    pub candidates: usize,
}

pub(crate) struct Scorer<'a> {
    config: &'a Configuration,
    ledger: &'a TermLedger,
    dynamic_stopwords: &'a TtlMap<String>,
}

impl<'a> Scorer<'a> {
    pub fn new(
        config: &'a Configuration,
        ledger: &'a TermLedger,
        dynamic_stopwords: &'a TtlMap<String>,
    ) -> Self {
        Self {
            config,
            ledger,
            dynamic_stopwords,
        }
    }

    /// Evaluates every term in parallel, then ranks the survivors. Terms are
    /// visited in lexical order so learned stopwords come back sorted.
    pub fn rank(&self, counts: HashMap<String, TermWindowCounts>, now: DateTime<Utc>) -> Ranking {
        let mut terms: Vec<(String, TermWindowCounts)> = counts.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let verdicts: Vec<Verdict> = terms
            .par_iter()
            .map(|(term, counts)| self.evaluate(term, counts, now))
            .collect();

        let mut ranking = Ranking {
            candidates: terms.len(),
            ..Ranking::default()
        };
        for verdict in verdicts {
            match verdict {
                Verdict::Rejected => {}
                Verdict::Suppressed(key) => ranking.learned_stopwords.push(key),
                Verdict::Topic(topic) => ranking.topics.push(topic),
            }
        }
        ranking.learned_stopwords.dedup();

        sort_topics(&mut ranking.topics);
        ranking.topics.truncate(self.config.topic_limit);
        ranking
    }

    pub fn evaluate(&self, term: &str, counts: &TermWindowCounts, now: DateTime<Utc>) -> Verdict {
        let cfg = self.config;
        let weights = &cfg.weights;
        let case_style = self.ledger.case_style(term);
        let key = term.to_lowercase();

        if cfg.enable_dynamic_stopwords
            && case_style != CaseStyle::AllCaps
            && self.dynamic_stopwords.contains(&key)
        {
            return Verdict::Rejected;
        }

        let weighted_short = weights.weighted_count(counts.short, counts.short_title);
        let weighted_prev = weights.weighted_count(counts.prev_short, counts.prev_short_title);
        let weighted_baseline = weights.weighted_count(counts.baseline, counts.baseline_title);
        let expected =
            weighted_baseline * cfg.short_window_secs / cfg.baseline_window_secs.max(1.0);

        let sources = counts.short_sources.len();
        let (min_short, min_sources) = match case_style {
            CaseStyle::Normal => (
                cfg.lowercase_min_short_count(),
                cfg.lowercase_min_unique_sources(),
            ),
            _ => (cfg.min_short_count, cfg.min_unique_sources),
        };
        if weighted_short < min_short as f64 || sources < min_sources {
            return Verdict::Rejected;
        }

        let burst_z = (weighted_short - expected) / (expected + 1.0).sqrt();
        let burst_ratio = weighted_short / expected.max(1.0);

        if self.is_background(case_style, counts.baseline, sources, burst_z, burst_ratio) {
            return Verdict::Suppressed(key);
        }

        let burst = weights.burst_weight * burst_z.max(0.0);
        let volume = weights.count_weight * weighted_short.ln_1p();
        let accel = weights.accel_weight * (weighted_short - weighted_prev).max(0.0);
        let spread = 1.0 + weights.source_weight * sources.saturating_sub(1) as f64;
        let score = (burst + volume + accel) * spread * case_style.weight(weights);

        Verdict::Topic(TrendingTopic {
            term: term.to_string(),
            score,
            short_count: counts.short,
            baseline_count: counts.baseline,
            unique_sources: sources,
            burst_z,
            burst_ratio,
            title_share: counts.short_title as f64 / counts.short.max(1) as f64,
            sample_headlines: self
                .ledger
                .sample_headlines(term, cfg.sample_headline_limit),
            last_seen_at: self.ledger.last_seen(term).unwrap_or(now),
        })
    }

    /// Widely reported, long-lived, lowercase and not bursting.
    fn is_background(
        &self,
        case_style: CaseStyle,
        baseline: u64,
        sources: usize,
        burst_z: f64,
        burst_ratio: f64,
    ) -> bool {
        let cfg = self.config;
        cfg.enable_dynamic_stopwords
            && case_style == CaseStyle::Normal
            && baseline >= cfg.dynamic_stopword_baseline_min
            && sources >= cfg.dynamic_stopword_min_sources
            && burst_z <= cfg.dynamic_stopword_burst_z_max
            && burst_ratio <= cfg.dynamic_stopword_burst_ratio_max
    }
}

/// Score desc, short count desc, most recent first, then term.
pub(crate) fn sort_topics(topics: &mut [TrendingTopic]) {
    topics.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.short_count.cmp(&a.short_count))
            .then_with(|| b.last_seen_at.cmp(&a.last_seen_at))
            .then_with(|| a.term.cmp(&b.term))
    });
}
