//! REST client for the Polymarket Gamma API.
//!
//! Read-only market discovery. Requests are rate-limited; an API key is
//! sent as a bearer token when configured.

use std::time::Duration;

use common::config::PolymarketConfig;
use common::{format_error_chain, summarize_body, Error};
use serde_json::Value;
use tracing::{debug, warn};

use crate::rate_limit::RateLimiter;
use crate::types::{decode_market_list, MarketPage};

const USER_AGENT: &str = "Orakel-Edge-Engine/1.0";

/// Filters for the `/markets` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketQuery {
    pub limit: u32,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub cursor: Option<String>,
}

impl MarketQuery {
    /// Open, unresolved markets.
    pub fn active(limit: u32) -> Self {
        Self {
            limit,
            active: Some(true),
            closed: Some(false),
            cursor: None,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(active) = self.active {
            params.push(("active", active.to_string()));
        }
        if let Some(closed) = self.closed {
            params.push(("closed", closed.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            params.push(("cursor", cursor.to_string()));
        }
        params
    }
}

/// Async REST client for Gamma market data.
#[derive(Debug, Clone)]
pub struct PolymarketClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl PolymarketClient {
    pub fn new(config: &PolymarketConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(4)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Polymarket HTTP client: {}", e)))?;

        let api_key = Some(config.api_key.trim().to_string()).filter(|k| !k.is_empty());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter: RateLimiter::per_second(config.reads_per_sec),
        })
    }

    /// URL helper.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Read endpoints ────────────────────────────────────────────────

    /// Fetch one page of markets.
    ///
    /// An unrecognized response envelope is an error, not an empty page.
    pub async fn fetch_markets(&self, query: &MarketQuery) -> Result<MarketPage, Error> {
        self.limiter.wait_read().await;

        let url = self.url("/markets");
        debug!("GET {} {:?}", url, query.params());

        let mut req = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&query.params());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| Error::Http(format_error_chain(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Polymarket(format!(
                "{} {}",
                status.as_u16(),
                summarize_body(&body)
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))?;

        let page = decode_market_list(body).map_err(|e| {
            warn!("Polymarket: {}", e);
            e
        })?;

        debug!(
            "Fetched {} markets (count={}, next_cursor={})",
            page.markets.len(),
            page.count,
            page.next_cursor.is_some()
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_query_params() {
        let q = MarketQuery::active(20);
        assert_eq!(
            q.params(),
            vec![
                ("limit", "20".to_string()),
                ("active", "true".to_string()),
                ("closed", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_cursor_param_only_when_set() {
        let mut q = MarketQuery { limit: 5, ..MarketQuery::default() };
        q.cursor = Some(String::new());
        assert_eq!(q.params().len(), 1);

        q.cursor = Some("MjA=".into());
        assert_eq!(q.params()[1], ("cursor", "MjA=".to_string()));
    }

    #[test]
    fn test_client_normalizes_config() {
        let config = PolymarketConfig {
            base_url: "https://gamma.test/".into(),
            api_key: "   ".into(),
            ..PolymarketConfig::default()
        };
        let client = PolymarketClient::new(&config).unwrap();
        assert_eq!(client.url("/markets"), "https://gamma.test/markets");
        assert!(client.api_key.is_none());
    }
}
