use itertools::Itertools;
use std::collections::HashMap;

use crate::config::Configuration;
use crate::dedupe::TtlMap;
use crate::models::{CaseStyle, NewsItem};
use crate::tokenize::{
    is_all_caps, is_numeric_word, is_short_proper_noun, is_title_case, nfc, phrase_case,
    raw_words, strip_url_segments, title_case_runs, Token,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TermCandidate {
    pub term: String,
    pub case_style: CaseStyle,
    pub from_title: bool,
}

/// Insertion-ordered candidates, unique by term. With a limit, nothing new is
/// accepted (not even merges) once the limit is reached.
struct CandidateSet {
    terms: Vec<TermCandidate>,
    index: HashMap<String, usize>,
    limit: Option<usize>,
}

impl CandidateSet {
    fn new(limit: Option<usize>) -> Self {
        Self {
            terms: Vec::new(),
            index: HashMap::new(),
            limit,
        }
    }

    fn push(&mut self, term: String, case_style: CaseStyle, from_title: bool) {
        if self.limit.is_some_and(|limit| self.terms.len() >= limit) || term.is_empty() {
            return;
        }
        if let Some(&i) = self.index.get(&term) {
            let existing = &mut self.terms[i];
            existing.case_style = existing.case_style.max(case_style);
            existing.from_title |= from_title;
            return;
        }
        self.index.insert(term.clone(), self.terms.len());
        self.terms.push(TermCandidate {
            term,
            case_style,
            from_title,
        });
    }
}

pub(crate) struct TermExtractor<'a> {
    config: &'a Configuration,
    dynamic_stopwords: &'a TtlMap<String>,
}

impl<'a> TermExtractor<'a> {
    pub fn new(config: &'a Configuration, dynamic_stopwords: &'a TtlMap<String>) -> Self {
        Self {
            config,
            dynamic_stopwords,
        }
    }

    /// Candidate order is title tokens, title n-grams, body tokens, body
    /// n-grams, then title-case runs. Without top-term selection the list is
    /// cut at `max_terms_per_item` in that order.
    pub fn extract(&self, item: &NewsItem) -> Vec<TermCandidate> {
        let cfg = self.config;
        let title = nfc(&item.title);
        let summary = item
            .body
            .as_deref()
            .map(|body| nfc(&body.chars().take(cfg.summary_max_length).collect::<String>()))
            .unwrap_or_default();

        let title_tokens = self.tokens(&strip_url_segments(&title));
        let body_tokens = self.tokens(&strip_url_segments(&summary));

        let limit = (!cfg.select_top_terms_per_item).then_some(cfg.max_terms_per_item);
        let mut set = CandidateSet::new(limit);
        self.push_sequence(&mut set, &title_tokens, true);
        self.push_sequence(&mut set, &body_tokens, false);

        if cfg.enable_title_case_phrases {
            for phrase in title_case_runs(&title) {
                set.push(self.canonicalize(&phrase), CaseStyle::TitleCase, true);
            }
        }

        if cfg.select_top_terms_per_item {
            self.select_top(set.terms)
        } else {
            set.terms
        }
    }

    /// Classifies and filters the words of one text field.
    fn tokens(&self, text: &str) -> Vec<Token> {
        let cfg = self.config;
        let mut tokens = Vec::new();
        for word in raw_words(text) {
            let all_caps = is_all_caps(&word);
            let title_case = !all_caps && is_title_case(&word);
            let short = word.chars().count() < cfg.min_token_length;
            if short && !(all_caps || is_short_proper_noun(&word, cfg.min_token_length)) {
                continue;
            }

            let lower = word.to_lowercase();
            if cfg.banned_terms.contains(&lower) {
                continue;
            }
            if !all_caps && cfg.stopwords.contains(&lower) {
                continue;
            }
            if !all_caps && cfg.enable_dynamic_stopwords && self.dynamic_stopwords.contains(&lower)
            {
                continue;
            }
            if !cfg.allow_numeric_tokens && is_numeric_word(&lower) {
                continue;
            }

            let (value, case_style) = if all_caps {
                (word.to_uppercase(), CaseStyle::AllCaps)
            } else if title_case {
                (lower, CaseStyle::TitleCase)
            } else {
                (lower, CaseStyle::Normal)
            };
            tokens.push(Token { value, case_style });
        }
        tokens
    }

    fn push_sequence(&self, set: &mut CandidateSet, tokens: &[Token], from_title: bool) {
        for token in tokens {
            set.push(self.canonicalize(&token.value), token.case_style, from_title);
        }
        if self.config.enable_bigrams {
            for (a, b) in tokens.iter().tuple_windows() {
                self.push_phrase(set, &[a, b], from_title);
            }
        }
        if self.config.enable_trigrams {
            for (a, b, c) in tokens.iter().tuple_windows() {
                self.push_phrase(set, &[a, b, c], from_title);
            }
        }
    }

    fn push_phrase(&self, set: &mut CandidateSet, parts: &[&Token], from_title: bool) {
        if self.phrase_filtered(parts) {
            return;
        }
        let phrase = parts.iter().map(|t| t.value.as_str()).join(" ");
        set.push(self.canonicalize(&phrase), phrase_case(parts), from_title);
    }

    fn phrase_filtered(&self, parts: &[&Token]) -> bool {
        let cfg = self.config;
        parts.iter().any(|token| {
            let word = token.value.to_lowercase();
            (cfg.filter_stopwords_in_phrases && cfg.stopwords.contains(&word))
                || cfg.banned_terms.contains(&word)
                || cfg.phrase_stopwords.contains(&word)
        })
    }

    /// Alias lookup on the lowercase form; otherwise acronyms stay uppercase
    /// and everything else is lowercased.
    pub fn canonicalize(&self, term: &str) -> String {
        let lowered = term.to_lowercase();
        if let Some(mapped) = self.config.alias_map.get(&lowered) {
            return mapped.clone();
        }
        if is_all_caps(term) {
            term.to_uppercase()
        } else {
            lowered
        }
    }

    fn candidate_score(&self, candidate: &TermCandidate) -> f64 {
        let weights = &self.config.weights;
        let position = if candidate.from_title {
            weights.title_token_weight
        } else {
            weights.body_token_weight
        };
        let words = candidate.term.split(' ').filter(|w| !w.is_empty()).count().max(1);
        let letters = candidate.term.chars().filter(|c| *c != ' ').count();
        let phrase_boost = 1.0 + (words - 1) as f64 * 0.35;
        let length_boost = 1.0 + (letters.min(20) as f64) / 20.0 * 0.15;
        candidate.case_style.weight(weights) * position * phrase_boost * length_boost
    }

    fn select_top(&self, terms: Vec<TermCandidate>) -> Vec<TermCandidate> {
        let limit = self.config.max_terms_per_item;
        if limit == 0 {
            return Vec::new();
        }
        let mut scored: Vec<(f64, TermCandidate)> = terms
            .into_iter()
            .map(|c| (self.candidate_score(&c), c))
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then_with(|| b.case_style.cmp(&a.case_style))
                .then_with(|| b.from_title.cmp(&a.from_title))
                .then_with(|| b.term.chars().count().cmp(&a.term.chars().count()))
                .then_with(|| a.term.cmp(&b.term))
        });
        scored.truncate(limit);
        scored.into_iter().map(|(_, c)| c).collect()
    }
}
