//! Gamma API payloads.
//!
//! The markets endpoint has shipped several envelopes over time. They are
//! decoded here into one `MarketPage`; anything else is rejected. Markets
//! inside a recognized envelope are decoded one by one, so a single bad
//! entry is dropped instead of the whole page.

use common::{Error, MarketSnapshot};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One market as returned by Gamma. Numeric and list fields arrive in
/// several encodings, so they stay as raw JSON until read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub question: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub image: Option<String>,
    /// ISO string, or epoch seconds on some listings.
    #[serde(default, deserialize_with = "optional_string")]
    pub end_date: Option<String>,
    /// JSON-encoded string, comma list, or array.
    #[serde(default)]
    pub outcomes: Option<Value>,
    #[serde(default)]
    pub outcome_prices: Option<Value>,
    /// Older field name for `outcomePrices`.
    #[serde(default)]
    pub prices: Option<Value>,
    /// String or number.
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub liquidity: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// An outcome and its price in whole percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeQuote {
    pub outcome: String,
    pub probability: i64,
}

impl GammaMarket {
    pub fn volume(&self) -> f64 {
        number_from(self.volume.as_ref())
    }

    pub fn liquidity(&self) -> f64 {
        number_from(self.liquidity.as_ref())
    }

    /// Probability (whole percent) of the outcome labelled YES, if any.
    pub fn yes_probability(&self) -> Option<i64> {
        parse_outcome_prices(self)
            .into_iter()
            .find(|q| {
                let label = q.outcome.to_lowercase();
                label == "yes" || label.contains("yes")
            })
            .map(|q| q.probability)
    }

    /// Engine input for this market. `None` without an id or question.
    pub fn to_snapshot(&self) -> Option<MarketSnapshot> {
        let id = self.id.trim();
        let question = self.question.trim();
        if id.is_empty() || question.is_empty() {
            return None;
        }

        let yes_price = self
            .yes_probability()
            .map(|p| p as f64 / 100.0)
            .unwrap_or(0.5);

        Some(MarketSnapshot {
            id: id.to_string(),
            question_text: question.to_string(),
            yes_price,
            volume: self.volume(),
            liquidity: self.liquidity(),
        })
    }
}

/// Pair outcome labels with prices.
///
/// Missing outcomes default to YES/NO; a missing or unparsable price
/// reads as 0.
pub fn parse_outcome_prices(market: &GammaMarket) -> Vec<OutcomeQuote> {
    let mut outcomes = string_list(market.outcomes.as_ref());
    let mut prices = string_list(market.outcome_prices.as_ref());
    if prices.is_empty() {
        prices = string_list(market.prices.as_ref());
    }
    if outcomes.is_empty() {
        outcomes = vec!["YES".to_string(), "NO".to_string()];
    }

    outcomes
        .into_iter()
        .enumerate()
        .map(|(i, outcome)| {
            let price = prices
                .get(i)
                .and_then(|p| p.trim().parse::<f64>().ok())
                .filter(|p| p.is_finite())
                .unwrap_or(0.0);
            OutcomeQuote {
                outcome: outcome.trim().to_string(),
                probability: (price * 100.0).round() as i64,
            }
        })
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Vec<Value>>(raw) {
                Ok(items) => items.iter().map(scalar_to_string).collect(),
                Err(_) => raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            }
        }
        Some(Value::Array(items)) => items.iter().map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn number_from(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ── Market list envelope ──────────────────────────────────────────────

/// Every accepted shape of the `/markets` response. Entries stay raw
/// until `MarketPage::from` decodes them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MarketListPayload {
    Bare(Vec<Value>),
    Data {
        data: Vec<Value>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default, alias = "cursor")]
        next_cursor: Option<String>,
    },
    Markets {
        markets: Vec<Value>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default, alias = "cursor")]
        next_cursor: Option<String>,
    },
}

/// One page of markets in canonical form.
#[derive(Debug, Clone, Default)]
pub struct MarketPage {
    pub markets: Vec<GammaMarket>,
    pub count: usize,
    pub next_cursor: Option<String>,
}

impl From<MarketListPayload> for MarketPage {
    fn from(payload: MarketListPayload) -> Self {
        let (entries, count, next_cursor) = match payload {
            MarketListPayload::Bare(entries) => (entries, None, None),
            MarketListPayload::Data { data, count, next_cursor } => (data, count, next_cursor),
            MarketListPayload::Markets {
                markets,
                count,
                next_cursor,
            } => (markets, count, next_cursor),
        };

        let markets: Vec<GammaMarket> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value::<GammaMarket>(entry) {
                Ok(market) => Some(market),
                Err(e) => {
                    warn!("Skipping undecodable market at index {}: {}", i, e);
                    None
                }
            })
            .collect();

        MarketPage {
            count: count.unwrap_or(markets.len()),
            next_cursor: next_cursor.filter(|c| !c.is_empty()),
            markets,
        }
    }
}

/// Normalize a `/markets` response body.
pub fn decode_market_list(value: Value) -> Result<MarketPage, Error> {
    let shape = describe_shape(&value);
    serde_json::from_value::<MarketListPayload>(value)
        .map(MarketPage::from)
        .map_err(|_| Error::Polymarket(format!("unrecognized market list shape: {}", shape)))
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "array".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn market(value: Value) -> GammaMarket {
        serde_json::from_value(value).expect("market decodes")
    }

    #[test]
    fn test_decode_bare_array() {
        let page = decode_market_list(json!([
            {"id": "1", "question": "Will it rain?"},
            {"id": 2, "question": "Will it snow?"}
        ]))
        .unwrap();

        assert_eq!(page.count, 2);
        assert_eq!(page.markets[1].id, "2");
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_decode_data_envelope() {
        let page = decode_market_list(json!({
            "limit": 20,
            "count": 120,
            "next_cursor": "MjA=",
            "data": [{"id": "1", "question": "Q"}]
        }))
        .unwrap();

        assert_eq!(page.markets.len(), 1);
        assert_eq!(page.count, 120);
        assert_eq!(page.next_cursor.as_deref(), Some("MjA="));
    }

    #[test]
    fn test_decode_markets_envelope() {
        let page = decode_market_list(json!({
            "markets": [{"id": "1", "question": "Q"}],
            "cursor": ""
        }))
        .unwrap();

        assert_eq!(page.count, 1);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_decode_rejects_unknown_shape() {
        let err = decode_market_list(json!({"error": "rate limited"})).unwrap_err();
        assert!(matches!(err, Error::Polymarket(_)));
        assert!(err.to_string().contains("keys [error]"));

        assert!(decode_market_list(json!("nope")).is_err());
        assert!(decode_market_list(json!({"data": "not a list"})).is_err());
    }

    #[test]
    fn test_bad_market_does_not_sink_the_page() {
        let page = decode_market_list(json!([
            {"id": "1", "question": null},
            {"id": "2", "question": "Will it snow?"},
            {"id": "3", "question": "Will it hail?", "active": "yes"}
        ]))
        .unwrap();

        let ids: Vec<&str> = page.markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(page.markets[0].to_snapshot().is_none());
        assert_eq!(page.markets[1].to_snapshot().unwrap().question_text, "Will it snow?");
    }

    #[test]
    fn test_numeric_end_date_is_accepted() {
        let page = decode_market_list(json!({
            "data": [
                {"id": "1", "question": "Q", "endDate": 1735689600, "slug": null},
                {"id": "2", "question": "R", "endDate": "2025-01-01T00:00:00Z"}
            ]
        }))
        .unwrap();

        assert_eq!(page.markets.len(), 2);
        assert_eq!(page.markets[0].end_date.as_deref(), Some("1735689600"));
        assert!(page.markets[0].slug.is_none());
        assert_eq!(page.markets[1].end_date.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_outcome_prices_json_encoded_strings() {
        let m = market(json!({
            "id": "1",
            "question": "Q",
            "outcomes": "[\"Yes\", \"No\"]",
            "outcomePrices": "[\"0.125\", \"0.875\"]"
        }));

        assert_eq!(
            parse_outcome_prices(&m),
            vec![
                OutcomeQuote { outcome: "Yes".into(), probability: 13 },
                OutcomeQuote { outcome: "No".into(), probability: 88 },
            ]
        );
    }

    #[test]
    fn test_outcome_prices_comma_and_array_forms() {
        let m = market(json!({
            "outcomes": "Yes, No",
            "outcomePrices": [0.3, 0.7]
        }));
        let quotes = parse_outcome_prices(&m);
        assert_eq!(quotes[0].probability, 30);
        assert_eq!(quotes[1].outcome, "No");
    }

    #[test]
    fn test_outcome_prices_defaults() {
        let m = market(json!({"prices": "0.42,abc"}));
        let quotes = parse_outcome_prices(&m);
        assert_eq!(quotes[0], OutcomeQuote { outcome: "YES".into(), probability: 42 });
        assert_eq!(quotes[1], OutcomeQuote { outcome: "NO".into(), probability: 0 });

        let bare = parse_outcome_prices(&GammaMarket::default());
        assert_eq!(bare.len(), 2);
        assert!(bare.iter().all(|q| q.probability == 0));
    }

    #[test]
    fn test_to_snapshot() {
        let m = market(json!({
            "id": "253591",
            "question": "Will Bitcoin exceed $150,000 by March 2025?",
            "outcomes": "[\"Yes\", \"No\"]",
            "outcomePrices": "[\"0.05\", \"0.95\"]",
            "volume": "1234567.89",
            "liquidity": 350000
        }));

        let snap = m.to_snapshot().unwrap();
        assert_eq!(snap.id, "253591");
        assert_eq!(snap.yes_price, 0.05);
        assert_eq!(snap.volume, 1234567.89);
        assert_eq!(snap.liquidity, 350000.0);
    }

    #[test]
    fn test_to_snapshot_without_yes_outcome() {
        let m = market(json!({
            "id": "7",
            "question": "Who wins?",
            "outcomes": ["Team A", "Team B"],
            "outcomePrices": ["0.6", "0.4"],
            "volume": "n/a"
        }));
        let snap = m.to_snapshot().unwrap();
        assert_eq!(snap.yes_price, 0.5);
        assert_eq!(snap.volume, 0.0);
    }

    #[test]
    fn test_to_snapshot_requires_id_and_question() {
        assert!(market(json!({"id": "1", "question": "  "})).to_snapshot().is_none());
        assert!(market(json!({"question": "Q"})).to_snapshot().is_none());
        assert!(market(json!({"id": null, "question": "Q"})).to_snapshot().is_none());
    }
}
