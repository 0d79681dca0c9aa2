use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words dropped from single-token extraction unless written in all caps.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    // english
    "a", "about", "after", "against", "all", "amid", "an", "and", "are", "as", "at", "be", "been",
    "before", "being", "but", "by", "for", "from", "has", "have", "he", "her", "his", "how", "if",
    "in", "into", "is", "it", "its", "me", "more", "my", "new", "no", "not", "of", "off", "on",
    "one", "or", "our", "out", "over", "she", "so", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "to", "under", "up", "us", "was", "we", "were",
    "what", "when", "where", "which", "who", "why", "with", "you", "your", "near", "people",
    // newsroom chatter
    "breaking", "latest", "live", "opinion", "says", "said", "update", "watch", "file", "files",
    "video", "videos",
    // modals and contractions (apostrophes are stripped before lookup)
    "can", "cant", "could", "couldnt", "may", "might", "must", "should", "shouldnt", "will", "wont",
    "would", "wouldnt", "dont", "doesnt", "didnt", "isnt", "arent", "wasnt", "werent", "hasnt",
    "havent", "hadnt",
    // calendar
    "day", "days", "week", "weeks", "month", "months", "year", "years", "today", "tonight",
    "yesterday", "tomorrow", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
    "sunday", "january", "february", "march", "april", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Reporting verbs that make poor phrase constituents ("officials warn", "police said").
pub const DEFAULT_PHRASE_STOPWORDS: &[&str] = &[
    "guard", "guards", "guarded", "guarding", "says", "said", "say", "saying", "warn", "warns",
    "warned", "warning", "calls", "called", "calling", "backs", "backed", "backing", "reports",
    "reported", "reporting", "sees", "saw", "seeing",
];

const URL_TLDS: &[&str] = &[
    "com", "org", "net", "gov", "edu", "io", "co", "uk", "us", "ca", "de", "fr", "it", "es", "ru",
    "cn", "info", "biz", "me", "tv", "ai",
];

/// Owned copy of [`DEFAULT_STOPWORDS`], ready to drop into a configuration.
pub fn default_stopwords() -> HashSet<String> {
    DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect()
}

/// Owned copy of [`DEFAULT_PHRASE_STOPWORDS`].
pub fn default_phrase_stopwords() -> HashSet<String> {
    DEFAULT_PHRASE_STOPWORDS.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn is_url_tld(segment: &str) -> bool {
    static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| URL_TLDS.iter().copied().collect());
    SET.contains(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_lowercase_and_unique() {
        for table in [DEFAULT_STOPWORDS, DEFAULT_PHRASE_STOPWORDS] {
            let set: HashSet<&str> = table.iter().copied().collect();
            assert_eq!(set.len(), table.len());
            assert!(table.iter().all(|w| *w == w.to_lowercase()));
        }
    }

    #[test]
    fn known_tlds() {
        assert!(is_url_tld("com"));
        assert!(is_url_tld("ai"));
        assert!(!is_url_tld("museum"));
    }
}
