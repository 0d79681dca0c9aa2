use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::models::{CaseStyle, HeadlineSample};

#[derive(Debug, Default)]
pub(crate) struct TermLedger {
    samples: HashMap<String, Vec<HeadlineSample>>,
    case_styles: HashMap<String, CaseStyle>,
    last_seen: HashMap<String, DateTime<Utc>>,
}

impl TermLedger {
    /// Upsert-merges one sighting of `term`.
    pub fn observe(
        &mut self,
        term: &str,
        case_style: CaseStyle,
        sample: HeadlineSample,
        sample_limit: usize,
    ) {
        let seen_at = sample.published_at;
        self.add_sample(term, sample, sample_limit);
        self.record_case(term, case_style);
        let last = self.last_seen.entry(term.to_string()).or_insert(seen_at);
        if seen_at > *last {
            *last = seen_at;
        }
    }

    /// Pool is unique by headline text (newest copy wins), newest first and
    /// capped at three times the output limit.
    fn add_sample(&mut self, term: &str, sample: HeadlineSample, sample_limit: usize) {
        if sample_limit == 0 {
            return;
        }
        let pool = self.samples.entry(term.to_string()).or_default();
        match pool.iter_mut().find(|s| s.headline == sample.headline) {
            Some(existing) => {
                if sample.published_at > existing.published_at {
                    *existing = sample;
                }
            }
            None => pool.push(sample),
        }
        pool.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        pool.truncate((sample_limit * 3).max(1));
    }

    /// Only distinguished casings are stored; a style is never downgraded.
    fn record_case(&mut self, term: &str, case_style: CaseStyle) {
        if case_style == CaseStyle::Normal {
            return;
        }
        let current = self.case_styles.entry(term.to_string()).or_insert(case_style);
        *current = (*current).max(case_style);
    }

    pub fn case_style(&self, term: &str) -> CaseStyle {
        self.case_styles.get(term).copied().unwrap_or_default()
    }

    pub fn last_seen(&self, term: &str) -> Option<DateTime<Utc>> {
        self.last_seen.get(term).copied()
    }

    /// Up to `limit` headlines, one per source first, then any other distinct
    /// headlines in pool order.
    pub fn sample_headlines(&self, term: &str, limit: usize) -> Vec<String> {
        let Some(pool) = self.samples.get(term) else {
            return Vec::new();
        };
        if limit == 0 {
            return Vec::new();
        }

        let mut picked: Vec<String> = Vec::with_capacity(limit);
        let mut used_sources: HashSet<&str> = HashSet::new();
        for sample in pool {
            if picked.len() >= limit {
                break;
            }
            if used_sources.insert(sample.source.as_str()) {
                picked.push(sample.headline.clone());
            }
        }
        for sample in pool {
            if picked.len() >= limit {
                break;
            }
            if !picked.contains(&sample.headline) {
                picked.push(sample.headline.clone());
            }
        }
        picked
    }

    /// Forgets samples published before `cutoff` and all state of terms last
    /// seen before it.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        self.samples.retain(|_, pool| {
            pool.retain(|s| s.published_at >= cutoff);
            !pool.is_empty()
        });
        let stale: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| **seen < cutoff)
            .map(|(term, _)| term.clone())
            .collect();
        for term in &stale {
            self.last_seen.remove(term);
            self.case_styles.remove(term);
            self.samples.remove(term);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.case_styles.clear();
        self.last_seen.clear();
    }

    pub fn tracked_terms(&self) -> usize {
        self.last_seen.len()
    }

    pub fn sample_pools(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn knows(&self, term: &str) -> bool {
        self.last_seen.contains_key(term)
            || self.case_styles.contains_key(term)
            || self.samples.contains_key(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(headline: &str, source: &str, at: DateTime<Utc>) -> HeadlineSample {
        HeadlineSample {
            headline: headline.into(),
            source: source.into(),
            published_at: at,
        }
    }

    #[test]
    fn case_style_only_upgrades() {
        let t0 = Utc::now();
        let mut ledger = TermLedger::default();
        ledger.observe("nato", CaseStyle::Normal, sample("h", "s", t0), 5);
        assert_eq!(ledger.case_style("nato"), CaseStyle::Normal);
        ledger.observe("nato", CaseStyle::AllCaps, sample("h", "s", t0), 5);
        ledger.observe("nato", CaseStyle::TitleCase, sample("h", "s", t0), 5);
        assert_eq!(ledger.case_style("nato"), CaseStyle::AllCaps);
    }

    #[test]
    fn last_seen_never_moves_back() {
        let t0 = Utc::now();
        let mut ledger = TermLedger::default();
        ledger.observe("x", CaseStyle::Normal, sample("a", "s", t0), 5);
        ledger.observe("x", CaseStyle::Normal, sample("b", "s", t0 - Duration::seconds(10)), 5);
        assert_eq!(ledger.last_seen("x"), Some(t0));
    }

    #[test]
    fn pool_dedupes_sorts_and_caps() {
        let t0 = Utc::now();
        let mut ledger = TermLedger::default();
        for i in 0..5 {
            let at = t0 + Duration::seconds(i);
            ledger.observe("x", CaseStyle::Normal, sample(&format!("h{i}"), "s", at), 1);
        }
        // limit 1 -> pool of 3, newest first
        ledger.observe("x", CaseStyle::Normal, sample("h2", "s", t0 + Duration::seconds(9)), 1);
        let pool = &ledger.samples["x"];
        let heads: Vec<&str> = pool.iter().map(|s| s.headline.as_str()).collect();
        assert_eq!(heads, vec!["h2", "h4", "h3"]);
    }

    #[test]
    fn headlines_prefer_distinct_sources_then_backfill() {
        let t0 = Utc::now();
        let mut ledger = TermLedger::default();
        ledger.observe("x", CaseStyle::Normal, sample("a1", "a", t0), 5);
        ledger.observe("x", CaseStyle::Normal, sample("a2", "a", t0 + Duration::seconds(1)), 5);
        ledger.observe("x", CaseStyle::Normal, sample("b1", "b", t0 + Duration::seconds(2)), 5);

        assert_eq!(ledger.sample_headlines("x", 2), vec!["b1", "a2"]);
        assert_eq!(ledger.sample_headlines("x", 3), vec!["b1", "a2", "a1"]);
        assert!(ledger.sample_headlines("x", 0).is_empty());
        assert!(ledger.sample_headlines("missing", 3).is_empty());
    }

    #[test]
    fn prune_forgets_stale_terms() {
        let t0 = Utc::now();
        let mut ledger = TermLedger::default();
        ledger.observe("old", CaseStyle::TitleCase, sample("o", "s", t0 - Duration::hours(2)), 5);
        ledger.observe("new", CaseStyle::TitleCase, sample("n", "s", t0), 5);
        assert_eq!(ledger.prune(t0 - Duration::hours(1)), 1);
        assert!(!ledger.knows("old"));
        assert!(ledger.knows("new"));
        assert_eq!(ledger.tracked_terms(), 1);
        assert_eq!(ledger.sample_pools(), 1);
    }
}
