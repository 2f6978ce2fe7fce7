//! Keyword extraction from market questions.
//!
//! Deterministic: the same input always yields the same ordered list.

use common::RawItem;

const STOPWORDS: [&str; 17] = [
    "will", "be", "by", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "from",
];

/// Extraction knobs for one caller.
#[derive(Debug, Clone, Copy)]
pub struct KeywordProfile {
    /// Minimum token length (characters).
    pub min_len: usize,
    /// Maximum number of keywords returned.
    pub max_keywords: usize,
    /// Drop standalone four-digit years.
    pub strip_years: bool,
    /// Additional stopwords for this caller.
    pub extra_stopwords: &'static [&'static str],
}

impl KeywordProfile {
    pub const SOCIAL: KeywordProfile = KeywordProfile {
        min_len: 4,
        max_keywords: 3,
        strip_years: false,
        extra_stopwords: &[],
    };

    pub const COMMUNITY: KeywordProfile = KeywordProfile {
        min_len: 4,
        max_keywords: 5,
        strip_years: false,
        extra_stopwords: &[],
    };

    pub const NEWS: KeywordProfile = KeywordProfile {
        min_len: 3,
        max_keywords: 8,
        strip_years: true,
        extra_stopwords: &["reach", "hit", "above", "below", "before", "after", "during"],
    };

    pub const TOPIC_TAGS: KeywordProfile = KeywordProfile {
        min_len: 4,
        max_keywords: 5,
        strip_years: false,
        extra_stopwords: &[],
    };
}

/// Lowercase alphanumeric tokens, in order of appearance.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

pub fn extract_keywords(text: &str, profile: &KeywordProfile) -> Vec<String> {
    tokenize(text)
        .filter(|w| w.chars().count() >= profile.min_len)
        .filter(|w| !(profile.strip_years && is_year(w)))
        .filter(|w| !STOPWORDS.contains(&w.as_str()) && !profile.extra_stopwords.contains(&w.as_str()))
        .take(profile.max_keywords)
        .collect()
}

/// Topical tags for display: keywords of the first five items, at most five.
pub fn topic_keywords(items: &[RawItem]) -> Vec<String> {
    items
        .iter()
        .take(5)
        .flat_map(|item| extract_keywords(&item.text(), &KeywordProfile::TOPIC_TAGS))
        .take(5)
        .collect()
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && token.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTION: &str = "Will Bitcoin exceed $150,000 by March 2025?";

    #[test]
    fn test_social_profile() {
        assert_eq!(
            extract_keywords(QUESTION, &KeywordProfile::SOCIAL),
            vec!["bitcoin", "exceed", "march"]
        );
    }

    #[test]
    fn test_community_profile_keeps_long_numbers() {
        assert_eq!(
            extract_keywords(QUESTION, &KeywordProfile::COMMUNITY),
            vec!["bitcoin", "exceed", "march", "2025"]
        );
    }

    #[test]
    fn test_news_profile_strips_years_and_extras() {
        let kws = extract_keywords(
            "Will the Fed cut rates before July 2025 or reach 3%?",
            &KeywordProfile::NEWS,
        );
        assert_eq!(kws, vec!["fed", "cut", "rates", "july"]);
    }

    #[test]
    fn test_deterministic_and_truncated() {
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let a = extract_keywords(text, &KeywordProfile::NEWS);
        let b = extract_keywords(text, &KeywordProfile::NEWS);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_eq!(a[0], "alpha");
    }

    #[test]
    fn test_empty_question() {
        assert!(extract_keywords("", &KeywordProfile::SOCIAL).is_empty());
        assert!(extract_keywords("?? !!", &KeywordProfile::NEWS).is_empty());
    }

    #[test]
    fn test_topic_keywords_caps_at_five() {
        let items = vec![
            RawItem::new("Bitcoin rally continues", "miners celebrate record"),
            RawItem::new("Ethereum upgrade", ""),
        ];
        let tags = topic_keywords(&items);
        assert_eq!(tags, vec!["bitcoin", "rally", "continues", "miners", "celebrate"]);
    }
}
