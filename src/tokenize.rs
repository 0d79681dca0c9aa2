use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::lexicon::is_url_tld;
use crate::models::CaseStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub value: String,
    pub case_style: CaseStyle,
}

pub(crate) fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Drops whitespace-delimited segments that look like links, domains or
/// e-mail addresses, rejoining the rest with single spaces.
pub(crate) fn strip_url_segments(text: &str) -> String {
    text.split_whitespace()
        .filter(|segment| !is_url_like(segment))
        .join(" ")
}

pub(crate) fn is_url_like(segment: &str) -> bool {
    static LINK_PREFIX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:https?://|www\.)").expect("link prefix pattern"));

    let lowered = segment.to_lowercase();
    if LINK_PREFIX.is_match(&lowered) || lowered.contains("://") {
        return true;
    }
    if lowered.contains('.') && (lowered.contains('/') || lowered.contains('@')) {
        return true;
    }
    let parts: Vec<&str> = lowered.split('.').filter(|p| !p.is_empty()).collect();
    parts.len() >= 2 && parts.last().is_some_and(|tld| is_url_tld(tld))
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2018}' | '\u{2019}')
}

/// Splits on anything that is neither alphanumeric nor an apostrophe;
/// apostrophes never break a word and are removed from the result
/// ("Biden's" -> "Bidens").
pub(crate) fn raw_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && !is_apostrophe(c))
        .map(|w| w.chars().filter(|c| !is_apostrophe(*c)).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect()
}

/// At least two letters and every letter uppercase.
pub(crate) fn is_all_caps(token: &str) -> bool {
    let mut letters = 0usize;
    for c in token.chars().filter(|c| c.is_alphabetic()) {
        if !c.is_uppercase() {
            return false;
        }
        letters += 1;
    }
    letters >= 2
}

pub(crate) fn is_title_case(token: &str) -> bool {
    match token.chars().next() {
        Some(first) if first.is_uppercase() => {
            token.chars().any(char::is_lowercase) || token == token.to_uppercase()
        }
        _ => false,
    }
}

/// Two-letter-ish capitalised words such as "Xi" that survive the minimum
/// length filter.
pub(crate) fn is_short_proper_noun(token: &str, min_token_length: usize) -> bool {
    let len = token.chars().count();
    if len < 2 || len >= min_token_length {
        return false;
    }
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(char::is_lowercase),
        _ => false,
    }
}

/// Only decimal digits (Unicode `Nd`); fractions and numeral letters are words.
pub(crate) fn is_numeric_word(word: &str) -> bool {
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("digit pattern"));
    DIGITS.is_match(word)
}

/// Case style of an n-gram built from already classified tokens.
pub(crate) fn phrase_case(tokens: &[&Token]) -> CaseStyle {
    if tokens.is_empty() {
        return CaseStyle::Normal;
    }
    if tokens.iter().all(|t| t.case_style == CaseStyle::AllCaps) {
        CaseStyle::AllCaps
    } else if tokens.iter().all(|t| t.case_style != CaseStyle::Normal) {
        CaseStyle::TitleCase
    } else {
        CaseStyle::Normal
    }
}

/// Maximal runs of two or more capitalised words in a raw headline
/// ("Federal Reserve Chair Powell speaks" -> "Federal Reserve Chair Powell").
pub(crate) fn title_case_runs(title: &str) -> Vec<String> {
    let words: Vec<&str> = title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < 2 {
        return Vec::new();
    }

    let mut phrases = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    for word in words {
        if is_title_case(word) || is_all_caps(word) {
            run.push(word);
            continue;
        }
        if run.len() >= 2 {
            phrases.push(run.join(" "));
        }
        run.clear();
    }
    if run.len() >= 2 {
        phrases.push(run.join(" "));
    }
    phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_like_segments() {
        for s in [
            "https://example.com/a",
            "HTTP://X.ORG",
            "www.bbc.co.uk",
            "ftp://host",
            "example.com/path",
            "editor@paper.net",
            "reuters.com",
            "Apple.AI",
        ] {
            assert!(is_url_like(s), "{s} should look like a url");
        }
        for s in ["U.S.", "Inc.", "3.5", "markets", "Co.", "e.g."] {
            assert!(!is_url_like(s), "{s} should not look like a url");
        }
    }

    #[test]
    fn strips_links_and_collapses_whitespace() {
        assert_eq!(
            strip_url_segments("Read  more at https://x.com/a\nor reuters.com today"),
            "Read more at or today"
        );
        assert_eq!(strip_url_segments("   "), "");
    }

    #[test]
    fn words_keep_apostrophes_inside() {
        assert_eq!(
            raw_words("Biden's plan—'rock 'n' roll' 2024!"),
            vec!["Bidens", "plan", "rock", "n", "roll", "2024"]
        );
        assert_eq!(raw_words("don\u{2019}t stop"), vec!["dont", "stop"]);
        assert!(raw_words("  --  ").is_empty());
    }

    #[test]
    fn casing_classification() {
        assert!(is_all_caps("NATO"));
        assert!(is_all_caps("G7S"));
        assert!(!is_all_caps("A"));
        assert!(!is_all_caps("G7"));
        assert!(!is_all_caps("Nato"));

        assert!(is_title_case("Nato"));
        assert!(is_title_case("NATO"));
        assert!(is_title_case("X1"));
        assert!(!is_title_case("nato"));
        assert!(!is_title_case("2024"));

        assert!(is_short_proper_noun("Xi", 3));
        assert!(!is_short_proper_noun("XI", 3));
        assert!(!is_short_proper_noun("Xia", 3));
        assert!(!is_short_proper_noun("X", 3));
    }

    #[test]
    fn numeric_words() {
        assert!(is_numeric_word("2024"));
        assert!(!is_numeric_word("g20"));
        assert!(!is_numeric_word(""));
        assert!(is_numeric_word("\u{0662}\u{0660}\u{0662}\u{0664}"));
        assert!(!is_numeric_word("\u{00bd}"));
        assert!(!is_numeric_word("\u{216b}"));
    }

    #[test]
    fn phrase_case_needs_every_token() {
        let caps = Token { value: "US".into(), case_style: CaseStyle::AllCaps };
        let title = Token { value: "senate".into(), case_style: CaseStyle::TitleCase };
        let plain = Token { value: "vote".into(), case_style: CaseStyle::Normal };
        assert_eq!(phrase_case(&[&caps, &caps]), CaseStyle::AllCaps);
        assert_eq!(phrase_case(&[&caps, &title]), CaseStyle::TitleCase);
        assert_eq!(phrase_case(&[&title, &plain]), CaseStyle::Normal);
        assert_eq!(phrase_case(&[]), CaseStyle::Normal);
    }

    #[test]
    fn title_case_runs_are_maximal() {
        assert_eq!(
            title_case_runs("Federal Reserve Chair Powell speaks at \"White House\" event"),
            vec!["Federal Reserve Chair Powell", "White House"]
        );
        assert_eq!(title_case_runs("NATO Summit opens"), vec!["NATO Summit"]);
        assert!(title_case_runs("Powell").is_empty());
        assert!(title_case_runs("all lower case words").is_empty());
    }
}
