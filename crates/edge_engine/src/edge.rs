//! Edge classification: does the aggregate signal disagree with the price?
//!
//! All arithmetic runs in probability points (0-100) so whole-percent
//! prices classify exactly.

use common::{AggregatedSignal, EdgeType, EdgeVerdict, MarketSnapshot, SuggestedAction};

/// Divergence (points) above which an edge is strong.
pub const STRONG_DIVERGENCE_PTS: f64 = 15.0;
/// Divergence (points) above which an edge is weak.
pub const WEAK_DIVERGENCE_PTS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeClassification {
    /// Probability of YES implied by the signal (0.0 - 1.0).
    pub signal_implied_yes: f64,
    /// |signal_implied_yes - yes_price| (0.0 - 1.0).
    pub divergence: f64,
    pub edge_type: EdgeType,
    pub edge_score: i32,
}

fn direction(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Classify the edge for an aggregate `score` (-100..=100) against a YES
/// price (0.0..=1.0).
///
/// An edge needs the signal and the market to lean opposite ways. A price
/// of exactly 0.5 or a score of 0 has no direction and never produces one.
pub fn classify_edge(score: i32, yes_price: f64) -> EdgeClassification {
    let score = score.clamp(-100, 100);
    let yes_pts = yes_price * 100.0;
    let implied_pts = 50.0 + f64::from(score) * 0.5;
    let divergence_pts = (implied_pts - yes_pts).abs();

    let signal_dir = direction(f64::from(score));
    let market_dir = direction(yes_pts - 50.0);
    let disagree = signal_dir != 0 && market_dir != 0 && signal_dir != market_dir;

    let (edge_type, edge_score) = if disagree && divergence_pts > STRONG_DIVERGENCE_PTS {
        (EdgeType::Positive, divergence_pts.round() as i32)
    } else if disagree && divergence_pts > WEAK_DIVERGENCE_PTS {
        (EdgeType::Positive, (divergence_pts / 2.0).round() as i32)
    } else {
        (EdgeType::Neutral, 0)
    };

    EdgeClassification {
        signal_implied_yes: implied_pts / 100.0,
        divergence: divergence_pts / 100.0,
        edge_type,
        edge_score,
    }
}

/// Directional hint. Only a positive edge can suggest taking a side.
pub fn suggest_action(edge_type: EdgeType, score: i32, yes_price: f64) -> SuggestedAction {
    match edge_type {
        EdgeType::Positive => {
            if score > 20 && yes_price < 0.3 {
                SuggestedAction::ConsiderYes
            } else if score < -20 && yes_price > 0.7 {
                SuggestedAction::ConsiderNo
            } else if score > 10 && yes_price < 0.4 {
                SuggestedAction::ConsiderYes
            } else if score < -10 && yes_price > 0.6 {
                SuggestedAction::ConsiderNo
            } else {
                SuggestedAction::Wait
            }
        }
        EdgeType::Negative => SuggestedAction::Avoid,
        EdgeType::Neutral => SuggestedAction::Wait,
    }
}

/// "1.2M", "350K", "42".
pub fn format_compact_amount(amount: f64) -> String {
    let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };

    if amount >= 1_000_000.0 {
        format!("{:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("{:.0}K", amount / 1_000.0)
    } else {
        format!("{:.0}", amount)
    }
}

pub fn build_reasoning(signal: &AggregatedSignal, market: &MarketSnapshot, edge_type: EdgeType) -> Vec<String> {
    let mut reasoning = vec![
        format!("Signal sentiment: {}", signal.overall_label.display()),
        format!(
            "Market price implies {}% YES probability",
            (market.yes_price * 100.0).round() as i64
        ),
        format!(
            "Volume: ${} | Liquidity: ${}",
            format_compact_amount(market.volume),
            format_compact_amount(market.liquidity)
        ),
    ];

    if edge_type == EdgeType::Positive {
        reasoning.push("Edge detected: signal diverges from market price".to_string());
    }

    reasoning
}

/// Build the final verdict for one market.
pub fn compute_edge(market: &MarketSnapshot, signal: AggregatedSignal) -> EdgeVerdict {
    let market = market.sanitized();
    let classification = classify_edge(signal.score, market.yes_price);
    let suggested_action = suggest_action(classification.edge_type, signal.score, market.yes_price);
    let reasoning = build_reasoning(&signal, &market, classification.edge_type);

    EdgeVerdict {
        no_price: 1.0 - market.yes_price,
        yes_price: market.yes_price,
        market_id: market.id,
        question_text: market.question_text,
        volume: market.volume,
        liquidity: market.liquidity,
        signal,
        edge_score: classification.edge_score,
        edge_type: classification.edge_type,
        suggested_action,
        reasoning,
    }
}
