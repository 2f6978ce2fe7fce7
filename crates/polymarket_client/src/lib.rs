//! Polymarket Gamma API client library.
//!
//! Supplies market snapshots for the edge engine.

pub mod rate_limit;
pub mod rest;
pub mod types;

pub use rate_limit::RateLimiter;
pub use rest::{MarketQuery, PolymarketClient};
pub use types::{decode_market_list, parse_outcome_prices, GammaMarket, MarketListPayload, MarketPage, OutcomeQuote};
