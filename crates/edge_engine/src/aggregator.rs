//! Weighted combination of the three source signals.

use common::{AggregatedSignal, ConfidenceLabel, SentimentLabel, SignalSource, SourceSignal};

use crate::sentiment::finite_or_zero;

/// Sources must move further than this to earn a reason sentence.
const REASON_THRESHOLD: f64 = 0.2;

const NEUTRAL_REASON: &str = "Sentiment is neutral across sources";

/// Weighted aggregate in roughly [-1, 1].
pub fn raw_aggregate(signals: &[SourceSignal; 3]) -> f64 {
    let total_weight: f64 = signals.iter().map(|s| s.source.weight()).sum();
    let weighted: f64 = signals
        .iter()
        .map(|s| finite_or_zero(s.sentiment) * finite_or_zero(s.confidence) * s.source.weight())
        .sum();

    if total_weight > 0.0 {
        finite_or_zero(weighted / total_weight)
    } else {
        0.0
    }
}

/// Combine per-source signals. Order is always social, community, news.
pub fn aggregate(social: SourceSignal, community: SourceSignal, news: SourceSignal) -> AggregatedSignal {
    let signals = [social, community, news].map(sanitized);
    debug_assert!(signals
        .iter()
        .zip(SignalSource::ALL)
        .all(|(signal, expected)| signal.source == expected));

    let raw = raw_aggregate(&signals);
    let score = ((raw * 100.0).round() as i32).clamp(-100, 100);

    let avg_confidence = signals.iter().map(|s| finite_or_zero(s.confidence)).sum::<f64>() / 3.0;

    let mut reasons: Vec<String> = signals.iter().filter_map(reason_for).collect();
    if reasons.is_empty() {
        reasons.push(NEUTRAL_REASON.to_string());
    }

    AggregatedSignal {
        overall_label: SentimentLabel::from_score(raw),
        score,
        confidence_label: ConfidenceLabel::from_average(avg_confidence),
        source_signals: signals,
        reasons,
    }
}

/// Non-finite numbers read as zero.
fn sanitized(mut signal: SourceSignal) -> SourceSignal {
    signal.sentiment = finite_or_zero(signal.sentiment);
    signal.confidence = finite_or_zero(signal.confidence);
    signal.velocity = finite_or_zero(signal.velocity);
    signal
}

fn reason_for(signal: &SourceSignal) -> Option<String> {
    if signal.sample_size == 0 || signal.sentiment.abs() <= REASON_THRESHOLD {
        return None;
    }

    let positive = signal.sentiment > 0.0;
    let sentence = match (signal.source, positive) {
        (SignalSource::Social, true) => "Positive momentum detected on X in the last 4 hours",
        (SignalSource::Social, false) => "Negative sentiment trending on X recently",
        (SignalSource::Community, true) => "Reddit discussions show optimism and interest",
        (SignalSource::Community, false) => "Reddit discussions show uncertainty and concern",
        (SignalSource::News, true) => "Recent news headlines are favorable",
        (SignalSource::News, false) => "Recent news headlines emphasize risks",
    };
    Some(sentence.to_string())
}
