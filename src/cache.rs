//! In-memory cache for upstream market listings.
//!
//! Evaluations always recompute; only the market list is reused between
//! runs so repeated `watch` cycles do not hammer the Gamma API.

use dashmap::DashMap;
use polymarket_client::GammaMarket;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached listing with staleness tracking.
#[derive(Debug, Clone)]
pub struct MarketListEntry {
    pub markets: Vec<GammaMarket>,
    pub fetched_at: Instant,
}

impl MarketListEntry {
    pub fn new(markets: Vec<GammaMarket>) -> Self {
        Self {
            markets,
            fetched_at: Instant::now(),
        }
    }

    pub fn is_stale(&self, ttl_secs: u64) -> bool {
        self.fetched_at.elapsed() >= Duration::from_secs(ttl_secs)
    }
}

/// Thread-safe listing cache keyed by requested page size.
pub type MarketListCache = Arc<DashMap<u32, MarketListEntry>>;

pub fn new_market_list_cache() -> MarketListCache {
    Arc::new(DashMap::new())
}

/// Fresh cached listing for `limit`, if any.
pub fn fresh_markets(cache: &MarketListCache, limit: u32, ttl_secs: u64) -> Option<Vec<GammaMarket>> {
    cache
        .get(&limit)
        .filter(|entry| !entry.is_stale(ttl_secs))
        .map(|entry| entry.markets.clone())
}
