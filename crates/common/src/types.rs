//! Domain types shared across the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Market Input ──────────────────────────────────────────────────────

/// A prediction market as seen by the edge engine.
///
/// Supplied per evaluation call by the upstream market provider; the
/// engine never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub id: String,
    pub question_text: String,
    /// Market-implied probability of YES (0.0 - 1.0).
    #[serde(default = "default_yes_price")]
    pub yes_price: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub liquidity: f64,
}

fn default_yes_price() -> f64 {
    0.5
}

impl MarketSnapshot {
    pub fn new(id: impl Into<String>, question_text: impl Into<String>, yes_price: f64) -> Self {
        Self {
            id: id.into(),
            question_text: question_text.into(),
            yes_price,
            volume: 0.0,
            liquidity: 0.0,
        }
    }

    /// Copy with numeric fields forced into their documented ranges.
    ///
    /// A non-finite price is treated as a coin flip (0.5); non-finite or
    /// negative volume/liquidity become 0.
    pub fn sanitized(&self) -> Self {
        let yes_price = if self.yes_price.is_finite() {
            self.yes_price.clamp(0.0, 1.0)
        } else {
            0.5
        };

        Self {
            id: self.id.clone(),
            question_text: self.question_text.clone(),
            yes_price,
            volume: non_negative(self.volume),
            liquidity: non_negative(self.liquidity),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ── Sources ───────────────────────────────────────────────────────────

/// One of the three public channels contributing sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Short-form social posts (X via mirror RSS).
    Social,
    /// Community discussion threads (Reddit).
    Community,
    /// News headlines (news-search RSS).
    News,
}

impl SignalSource {
    /// Fixed, stable evaluation order.
    pub const ALL: [SignalSource; 3] = [SignalSource::Social, SignalSource::Community, SignalSource::News];

    /// Aggregation weight. News is treated as the most reliable source.
    pub fn weight(self) -> f64 {
        match self {
            SignalSource::Social => 0.30,
            SignalSource::Community => 0.25,
            SignalSource::News => 0.45,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SignalSource::Social => "X",
            SignalSource::Community => "Reddit",
            SignalSource::News => "News",
        }
    }
}

/// Engagement metrics attached to an item, when the source exposes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    /// Upvotes / likes.
    pub score: f64,
    /// Comment or reply count.
    pub comments: f64,
}

/// One text item fetched from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub external_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

impl RawItem {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            published_at: None,
            external_link: String::new(),
            engagement: None,
        }
    }

    /// Title and body joined for scoring.
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }

    /// Age in hours relative to `now`, if the item carries a timestamp.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.published_at
            .map(|ts| (now - ts).num_seconds() as f64 / 3600.0)
    }
}

// ── Signals ───────────────────────────────────────────────────────────

/// Sentiment summary for a single source within one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSignal {
    pub source: SignalSource,
    /// -1.0 (bearish) to 1.0 (bullish).
    pub sentiment: f64,
    /// 0.0 to 1.0, driven by sample size.
    pub confidence: f64,
    /// Recent-activity multiplier, roughly 0.5 to 2.5.
    pub velocity: f64,
    pub sample_size: usize,
    pub keywords: Vec<String>,
    pub summary: String,
    pub observed_at: DateTime<Utc>,
}

/// Seven-point sentiment scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryBearish,
    Bearish,
    SlightlyBearish,
    Neutral,
    SlightlyBullish,
    Bullish,
    VeryBullish,
}

impl SentimentLabel {
    /// Map a raw aggregate in [-1, 1] onto the scale.
    pub fn from_score(raw: f64) -> Self {
        if raw >= 0.6 {
            SentimentLabel::VeryBullish
        } else if raw >= 0.3 {
            SentimentLabel::Bullish
        } else if raw >= 0.1 {
            SentimentLabel::SlightlyBullish
        } else if raw >= -0.1 {
            SentimentLabel::Neutral
        } else if raw >= -0.3 {
            SentimentLabel::SlightlyBearish
        } else if raw >= -0.6 {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::VeryBearish
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            SentimentLabel::VeryBullish => "Very Bullish",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::SlightlyBullish => "Slightly Bullish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::SlightlyBearish => "Slightly Bearish",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::VeryBearish => "Very Bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLabel {
    /// Bucket an average source confidence.
    pub fn from_average(avg: f64) -> Self {
        if avg > 0.7 {
            ConfidenceLabel::High
        } else if avg > 0.4 {
            ConfidenceLabel::Moderate
        } else {
            ConfidenceLabel::Low
        }
    }
}

/// Weighted combination of all three sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSignal {
    pub overall_label: SentimentLabel,
    /// -100 to 100.
    pub score: i32,
    pub confidence_label: ConfidenceLabel,
    /// Always social, community, news in that order.
    pub source_signals: [SourceSignal; 3],
    pub reasons: Vec<String>,
}

// ── Verdict ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    ConsiderYes,
    ConsiderNo,
    Wait,
    Avoid,
}

/// Final output of one market evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVerdict {
    pub market_id: String,
    pub question_text: String,
    pub yes_price: f64,
    pub no_price: f64,
    pub volume: f64,
    pub liquidity: f64,
    pub signal: AggregatedSignal,
    pub edge_score: i32,
    pub edge_type: EdgeType,
    pub suggested_action: SuggestedAction,
    pub reasoning: Vec<String>,
}
