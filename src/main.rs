//! Orakel: public-sentiment edge engine for prediction markets.
//!
//! Single-binary Tokio application that:
//! 1. Pulls active markets from Polymarket
//! 2. Gathers social, community and news sentiment per question
//! 3. Scores and aggregates the sentiment
//! 4. Flags markets whose price disagrees with the signal

mod cache;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use common::{EdgeVerdict, EngineConfig, Error, MarketSnapshot};
use edge_engine::EdgeEngine;
use polymarket_client::{parse_outcome_prices, GammaMarket, MarketQuery, OutcomeQuote, PolymarketClient};

use crate::cache::{fresh_markets, new_market_list_cache, MarketListCache, MarketListEntry};

const DEFAULT_LOG_FILTER: &str = "orakel=info,edge_engine=info,signal_sources=info,polymarket_client=info";

/// Prediction-market edge engine
#[derive(Parser)]
#[command(name = "orakel", about = "Compare public sentiment with prediction-market prices")]
struct Cli {
    /// Path to the TOML config file (optional).
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a single market question and print the verdict.
    Evaluate {
        #[arg(long)]
        question: String,
        /// Market-implied probability of YES (0.0 - 1.0).
        #[arg(long)]
        yes_price: f64,
        #[arg(long, default_value = "cli")]
        id: String,
        #[arg(long, default_value_t = 0.0)]
        volume: f64,
        #[arg(long, default_value_t = 0.0)]
        liquidity: f64,
    },
    /// Fetch active markets and evaluate each one.
    Markets {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Re-run `markets` on an interval until Ctrl+C.
    Watch {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,
    },
}

// ── Output ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrichedMarket {
    id: String,
    question: String,
    slug: String,
    image: String,
    end_date: String,
    outcomes: Vec<OutcomeQuote>,
    volume: f64,
    liquidity: f64,
    active: bool,
    closed: bool,
    edge: EdgeVerdict,
}

#[derive(Debug, Serialize)]
struct MarketsResponse {
    success: bool,
    count: usize,
    markets: Vec<EnrichedMarket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn enrich(market: &GammaMarket, snapshot: &MarketSnapshot, edge: EdgeVerdict) -> EnrichedMarket {
    EnrichedMarket {
        id: snapshot.id.clone(),
        question: snapshot.question_text.clone(),
        slug: market.slug.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| snapshot.id.clone()),
        image: market.image.clone().unwrap_or_default(),
        end_date: market.end_date.clone().unwrap_or_default(),
        outcomes: parse_outcome_prices(market),
        volume: snapshot.volume,
        liquidity: snapshot.liquidity,
        active: market.active != Some(false),
        closed: market.closed == Some(true),
        edge,
    }
}

/// Markets that can be evaluated, paired with their engine input.
fn evaluable(markets: &[GammaMarket]) -> Vec<(&GammaMarket, MarketSnapshot)> {
    markets
        .iter()
        .filter_map(|m| match m.to_snapshot() {
            Some(snapshot) => Some((m, snapshot)),
            None => {
                warn!("Skipping market without id or question (id='{}')", m.id);
                None
            }
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Commands ──────────────────────────────────────────────────────────

struct App {
    cfg: EngineConfig,
    engine: EdgeEngine,
    polymarket: PolymarketClient,
    market_cache: MarketListCache,
}

impl App {
    fn new(cfg: EngineConfig) -> Result<Self> {
        let engine = EdgeEngine::from_config(&cfg).context("failed to build source transport")?;
        let polymarket = PolymarketClient::new(&cfg.polymarket).context("failed to build Polymarket client")?;

        Ok(Self {
            cfg,
            engine,
            polymarket,
            market_cache: new_market_list_cache(),
        })
    }

    fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.cfg.polymarket.default_limit)
            .clamp(1, self.cfg.evaluation.max_markets)
    }

    async fn load_markets(&self, limit: u32) -> Result<Vec<GammaMarket>, Error> {
        let ttl = self.cfg.cache.market_list_ttl_secs;
        if let Some(markets) = fresh_markets(&self.market_cache, limit, ttl) {
            info!("Using cached market list ({} markets)", markets.len());
            return Ok(markets);
        }

        let page = self.polymarket.fetch_markets(&MarketQuery::active(limit)).await?;
        info!(
            "Fetched {} markets from Polymarket (reported count={})",
            page.markets.len(),
            page.count
        );
        self.market_cache.insert(limit, MarketListEntry::new(page.markets.clone()));
        Ok(page.markets)
    }

    async fn markets(&self, limit: u32) -> Result<MarketsResponse, Error> {
        let markets = self.load_markets(limit).await?;
        if markets.is_empty() {
            warn!("No markets returned from Polymarket");
            return Ok(MarketsResponse {
                success: true,
                count: 0,
                markets: Vec::new(),
                warning: Some("No active markets found".into()),
            });
        }

        let pairs = evaluable(&markets);
        let snapshots: Vec<MarketSnapshot> = pairs.iter().map(|(_, s)| s.clone()).collect();
        let verdicts = self
            .engine
            .evaluate_many(&snapshots, self.cfg.evaluation.max_concurrent_evaluations)
            .await;

        let enriched: Vec<EnrichedMarket> = pairs
            .iter()
            .zip(verdicts)
            .map(|((market, snapshot), verdict)| enrich(market, snapshot, verdict))
            .collect();

        info!("Evaluated {} markets", enriched.len());

        Ok(MarketsResponse {
            success: true,
            count: enriched.len(),
            markets: enriched,
            warning: None,
        })
    }
}

async fn run_evaluate(app: &App, market: MarketSnapshot) -> Result<()> {
    let verdict = app.engine.evaluate(&market).await;
    print_json(&verdict)
}

async fn run_markets(app: &App, limit: Option<u32>) -> Result<bool> {
    match app.markets(app.page_size(limit)).await {
        Ok(response) => {
            print_json(&response)?;
            Ok(true)
        }
        Err(e) => {
            error!("Market listing failed: {}", e);
            print_json(&ErrorResponse {
                success: false,
                error: e.to_string(),
            })?;
            Ok(false)
        }
    }
}

async fn run_watch(app: &App, limit: Option<u32>, interval_secs: u64) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("Watching markets every {}s. Press Ctrl+C to stop.", interval_secs.max(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                return Ok(());
            }
            _ = interval.tick() => {
                if !run_markets(app, limit).await? {
                    warn!("Cycle failed; retrying on next tick");
                }
            }
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    // stdout carries command output; logs go to stderr.
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let cfg = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Sources: {} nitter instances, {} forums (max {} tried), timeout={}s",
        cfg.sources.nitter_instances.len(),
        cfg.sources.forums.len(),
        cfg.sources.max_forum_attempts,
        cfg.sources.attempt_timeout_secs,
    );
    info!(
        "Polymarket: {} (api key: {}), cache ttl={}s, concurrency={}",
        cfg.polymarket.base_url,
        if cfg.polymarket.api_key.trim().is_empty() { "none" } else { "set" },
        cfg.cache.market_list_ttl_secs,
        cfg.evaluation.max_concurrent_evaluations,
    );

    let app = App::new(cfg)?;

    match cli.command {
        Command::Evaluate {
            question,
            yes_price,
            id,
            volume,
            liquidity,
        } => {
            let market = MarketSnapshot {
                id,
                question_text: question,
                yes_price,
                volume,
                liquidity,
            };
            run_evaluate(&app, market).await
        }
        Command::Markets { limit } => {
            if !run_markets(&app, limit).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Watch { limit, interval_secs } => run_watch(&app, limit, interval_secs).await,
    }
}
