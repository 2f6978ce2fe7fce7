//! Engine configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Source endpoints and fetch behaviour.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Upstream market provider.
    #[serde(default)]
    pub polymarket: PolymarketConfig,

    /// Caching done by the calling layer.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch evaluation limits.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Candidate endpoints for the three signal sources, tried in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// User-Agent sent with every source request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt timeout (seconds). Expiry counts as a failed attempt.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Nitter mirror instances for short-form posts.
    #[serde(default = "default_nitter_instances")]
    pub nitter_instances: Vec<String>,

    /// Curated forums searched before the unscoped fallback.
    #[serde(default = "default_forums")]
    pub forums: Vec<String>,

    /// How many curated forums to try per evaluation.
    #[serde(default = "default_max_forum_attempts")]
    pub max_forum_attempts: usize,

    /// Reddit base URL.
    #[serde(default = "default_community_base")]
    pub community_base_url: String,

    /// News-search RSS base URL.
    #[serde(default = "default_news_base")]
    pub news_base_url: String,
}

/// Polymarket Gamma API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketConfig {
    #[serde(default = "default_gamma_base")]
    pub base_url: String,

    /// Optional bearer token.
    #[serde(default)]
    pub api_key: String,

    /// Default number of markets to list.
    #[serde(default = "default_market_limit")]
    pub default_limit: u32,

    /// Client-side read rate limit.
    #[serde(default = "default_reads_per_sec")]
    pub reads_per_sec: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Market-list caching in the calling layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_market_ttl")]
    pub market_list_ttl_secs: u64,
}

/// Limits for evaluating many markets at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrent_evaluations: usize,

    /// Hard cap on markets per listing request.
    #[serde(default = "default_max_markets")]
    pub max_markets: u32,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_user_agent() -> String {
    "Orakel-Edge-Engine/1.0".into()
}
fn default_attempt_timeout() -> u64 {
    5
}
fn default_max_forum_attempts() -> usize {
    5
}
fn default_community_base() -> String {
    "https://www.reddit.com".into()
}
fn default_news_base() -> String {
    "https://news.google.com".into()
}

fn default_gamma_base() -> String {
    "https://gamma-api.polymarket.com".into()
}
fn default_market_limit() -> u32 {
    20
}
fn default_reads_per_sec() -> u32 {
    10
}
fn default_request_timeout() -> u64 {
    15
}

fn default_market_ttl() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    8
}
fn default_max_markets() -> u32 {
    50
}

fn default_nitter_instances() -> Vec<String> {
    vec![
        "https://nitter.net".into(),
        "https://nitter.it".into(),
        "https://nitter.42l.fr".into(),
        "https://nitter.pussthecat.org".into(),
    ]
}

fn default_forums() -> Vec<String> {
    [
        "worldnews",
        "news",
        "politics",
        "economics",
        "business",
        "stocks",
        "cryptocurrency",
        "bitcoin",
        "ethereum",
        "investing",
        "wallstreetbets",
        "sports",
        "nfl",
        "nba",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            attempt_timeout_secs: default_attempt_timeout(),
            nitter_instances: default_nitter_instances(),
            forums: default_forums(),
            max_forum_attempts: default_max_forum_attempts(),
            community_base_url: default_community_base(),
            news_base_url: default_news_base(),
        }
    }
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_gamma_base(),
            api_key: String::new(),
            default_limit: default_market_limit(),
            reads_per_sec: default_reads_per_sec(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            market_list_ttl_secs: default_market_ttl(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_evaluations: default_max_concurrency(),
            max_markets: default_max_markets(),
        }
    }
}
