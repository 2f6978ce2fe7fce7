//! Per-source sentiment scoring.
//!
//! Pure functions: every value that depends on the clock takes `now` as
//! an argument, so identical inputs always score identically.

use chrono::{DateTime, Utc};
use common::{RawItem, SignalSource, SourceSignal};
use signal_sources::keywords::{tokenize, topic_keywords};
use signal_sources::SourceFetch;

/// Bullish and bearish term lists for one source. The lists are disjoint.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub bullish: &'static [&'static str],
    pub bearish: &'static [&'static str],
}

impl Lexicon {
    /// Market slang for short-form posts.
    pub const SOCIAL: Lexicon = Lexicon {
        bullish: &[
            "bullish", "moon", "pump", "breakout", "rally", "surge", "up", "rise", "gain", "win",
            "success", "positive", "good", "great", "bull", "long", "🚀", "📈",
        ],
        bearish: &[
            "bearish", "dump", "crash", "selloff", "decline", "down", "fall", "drop", "loss", "fail",
            "negative", "bad", "terrible", "risk", "warning", "bear", "short", "📉", "🔻",
        ],
    };

    /// Market slang for discussion threads.
    pub const COMMUNITY: Lexicon = Lexicon {
        bullish: &[
            "bullish", "moon", "pump", "breakout", "rally", "surge", "up", "rise", "gain", "win",
            "success", "positive", "good", "great", "excellent",
        ],
        bearish: &[
            "bearish", "dump", "crash", "selloff", "decline", "down", "fall", "drop", "loss", "fail",
            "negative", "bad", "terrible", "risk", "warning",
        ],
    };

    /// General tone words for headlines.
    pub const NEWS: Lexicon = Lexicon {
        bullish: &[
            "surge", "rally", "gain", "rise", "up", "breakthrough", "success", "growth", "positive",
            "optimistic", "bullish", "win", "victory", "record", "high",
        ],
        bearish: &[
            "crash", "fall", "drop", "decline", "down", "loss", "failure", "negative", "pessimistic",
            "bearish", "risk", "warning", "concern", "crisis", "low",
        ],
    };

    pub fn for_source(source: SignalSource) -> Lexicon {
        match source {
            SignalSource::Social => Lexicon::SOCIAL,
            SignalSource::Community => Lexicon::COMMUNITY,
            SignalSource::News => Lexicon::NEWS,
        }
    }
}

/// Upper bound on any engagement boost.
pub const MAX_ENGAGEMENT_BOOST: f64 = 0.2;

/// Score one piece of text in [-1, 1].
///
/// `engagement_boost` (clamped to `0..=MAX_ENGAGEMENT_BOOST`) pushes a
/// non-zero base further in its own direction. It never creates a
/// direction on its own.
pub fn score_text(text: &str, lexicon: &Lexicon, engagement_boost: f64) -> f64 {
    let lower = text.to_lowercase();
    let tokens: Vec<String> = tokenize(&lower).collect();

    let bullish = count_terms(&lower, &tokens, lexicon.bullish);
    let bearish = count_terms(&lower, &tokens, lexicon.bearish);

    let total = bullish + bearish;
    if total == 0 {
        return 0.0;
    }

    let base = (bullish as f64 - bearish as f64) / total.max(1) as f64;
    if base == 0.0 {
        return 0.0;
    }

    let boost = if engagement_boost.is_finite() {
        engagement_boost.clamp(0.0, MAX_ENGAGEMENT_BOOST)
    } else {
        0.0
    };

    (base + base.signum() * boost).clamp(-1.0, 1.0)
}

/// Word terms match whole tokens; emoji terms match anywhere in the text.
fn count_terms(lower: &str, tokens: &[String], terms: &[&str]) -> usize {
    terms
        .iter()
        .map(|term| {
            if term.chars().all(char::is_alphanumeric) {
                tokens.iter().filter(|t| t.as_str() == *term).count()
            } else {
                lower.matches(term).count()
            }
        })
        .sum()
}

// ── Per-source knobs ──────────────────────────────────────────────────

struct ScoringProfile {
    lexicon: Lexicon,
    /// Largest boost engagement may add.
    boost_cap: f64,
    /// Sample size at which confidence saturates.
    confidence_normalizer: f64,
    /// Items younger than this count as recent.
    recent_window_hours: f64,
    item_noun: &'static str,
    positive_phrase: &'static str,
    negative_phrase: &'static str,
    mixed_phrase: &'static str,
    empty_summary: &'static str,
}

fn profile(source: SignalSource) -> ScoringProfile {
    match source {
        SignalSource::Social => ScoringProfile {
            lexicon: Lexicon::SOCIAL,
            boost_cap: 0.15,
            confidence_normalizer: 20.0,
            recent_window_hours: 4.0,
            item_noun: "posts on X",
            positive_phrase: "with positive momentum",
            negative_phrase: "with negative sentiment",
            mixed_phrase: "with mixed sentiment",
            empty_summary: "No posts found on X",
        },
        SignalSource::Community => ScoringProfile {
            lexicon: Lexicon::COMMUNITY,
            boost_cap: 0.2,
            confidence_normalizer: 20.0,
            recent_window_hours: 24.0,
            item_noun: "Reddit posts",
            positive_phrase: "with positive sentiment",
            negative_phrase: "with negative sentiment",
            mixed_phrase: "with mixed sentiment",
            empty_summary: "No Reddit discussions found",
        },
        SignalSource::News => ScoringProfile {
            lexicon: Lexicon::NEWS,
            boost_cap: 0.0,
            confidence_normalizer: 15.0,
            recent_window_hours: 24.0,
            item_noun: "news articles",
            positive_phrase: "with favorable headlines",
            negative_phrase: "with negative headlines",
            mixed_phrase: "with mixed headlines",
            empty_summary: "No news coverage found",
        },
    }
}

/// Engagement in [0, 1] for one item.
///
/// Community items carry upvotes and comments. Feeds for the other
/// sources do not, so social engagement is estimated from freshness and
/// news gets none.
pub fn normalized_engagement(source: SignalSource, item: &RawItem, now: DateTime<Utc>) -> f64 {
    match source {
        SignalSource::Community => item
            .engagement
            .map(|e| (e.score / 100.0).clamp(0.0, 1.0) * 0.7 + (e.comments / 50.0).clamp(0.0, 1.0) * 0.3)
            .unwrap_or(0.0),
        SignalSource::Social => item
            .age_hours(now)
            .map(|age| (100.0 - age.max(0.0) * 5.0).max(0.0) / 100.0)
            .unwrap_or(0.0),
        SignalSource::News => 0.0,
    }
}

/// Score a single item as its source would.
pub fn score_item(source: SignalSource, item: &RawItem, now: DateTime<Utc>) -> f64 {
    let p = profile(source);
    let boost = normalized_engagement(source, item, now) * p.boost_cap;
    score_text(&item.text(), &p.lexicon, boost)
}

/// Collapse one source's fetch into its `SourceSignal`.
pub fn summarize_source(source: SignalSource, fetch: &SourceFetch, now: DateTime<Utc>) -> SourceSignal {
    let p = profile(source);
    let items = &fetch.items;

    if items.is_empty() {
        // An empty news search reports thin coverage.
        let searched_news = source == SignalSource::News && !fetch.keywords.is_empty();
        let quiet_news = source == SignalSource::News && fetch.last_error.is_none();
        let confidence = if searched_news || quiet_news {
            0.2
        } else {
            0.1
        };
        let summary = if searched_news {
            let lead = &fetch.keywords[..fetch.keywords.len().min(2)];
            format!("Found limited news coverage for \"{}\"", lead.join(", "))
        } else {
            match &fetch.last_error {
                Some(err) => format!("{} ({})", p.empty_summary, err),
                None => p.empty_summary.to_string(),
            }
        };
        let keywords = if searched_news {
            fetch.keywords.iter().take(3).cloned().collect()
        } else {
            fetch.keywords.clone()
        };

        return SourceSignal {
            source,
            sentiment: 0.0,
            confidence,
            velocity: 0.5,
            sample_size: 0,
            keywords,
            summary,
            observed_at: now,
        };
    }

    let n = items.len() as f64;
    let sentiment = items.iter().map(|item| score_item(source, item, now)).sum::<f64>() / n;
    let confidence = (n / p.confidence_normalizer).min(1.0);

    let recent = items
        .iter()
        .filter(|item| {
            item.age_hours(now)
                .map(|age| age < p.recent_window_hours)
                .unwrap_or(false)
        })
        .count();
    let velocity = (0.5 + (recent as f64 / n) * 2.0).min(2.5);

    let mut summary = format!("Found {} {}", items.len(), p.item_noun);
    if recent > 0 {
        summary.push_str(&format!(" ({} in last {}h)", recent, p.recent_window_hours));
    }
    summary.push(' ');
    summary.push_str(if sentiment > 0.2 {
        p.positive_phrase
    } else if sentiment < -0.2 {
        p.negative_phrase
    } else {
        p.mixed_phrase
    });

    if source == SignalSource::Community {
        let (score_sum, comment_sum) = items
            .iter()
            .filter_map(|item| item.engagement)
            .fold((0.0, 0.0), |(s, c), e| (s + e.score, c + e.comments));
        summary.push_str(&format!(
            " (avg {:.0} upvotes, {:.0} comments)",
            score_sum / n,
            comment_sum / n
        ));
    }

    let mut keywords = topic_keywords(items);
    if keywords.is_empty() {
        keywords = fetch.keywords.clone();
    }

    SourceSignal {
        source,
        sentiment: finite_or_zero(sentiment).clamp(-1.0, 1.0),
        confidence: finite_or_zero(confidence).clamp(0.0, 1.0),
        velocity: finite_or_zero(velocity),
        sample_size: items.len(),
        keywords,
        summary,
        observed_at: now,
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
