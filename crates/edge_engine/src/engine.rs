//! Evaluation entry point.
//!
//! One evaluation fans out to the three source fetchers concurrently,
//! waits for all of them, then scores, aggregates and classifies. Nothing
//! here returns an error: a failed source only lowers confidence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::config::SourcesConfig;
use common::{EdgeVerdict, EngineConfig, Error, MarketSnapshot, SignalSource};
use futures_util::stream::{self, StreamExt};
use signal_sources::{community, news, social, HttpFetch, ReqwestFetch};
use tracing::{debug, info, info_span, Instrument};

use crate::aggregator::aggregate;
use crate::edge::compute_edge;
use crate::sentiment::summarize_source;

/// Stateless edge engine. Cheap to clone and share across tasks.
#[derive(Clone)]
pub struct EdgeEngine {
    transport: Arc<dyn HttpFetch>,
    sources: SourcesConfig,
}

impl EdgeEngine {
    pub fn new(transport: Arc<dyn HttpFetch>, sources: SourcesConfig) -> Self {
        Self { transport, sources }
    }

    /// Build an engine backed by a real HTTP client.
    pub fn from_config(config: &EngineConfig) -> Result<Self, Error> {
        let transport = ReqwestFetch::new(
            &config.sources.user_agent,
            Duration::from_secs(config.sources.attempt_timeout_secs),
        )?;
        Ok(Self::new(Arc::new(transport), config.sources.clone()))
    }

    /// Evaluate one market. Always produces a verdict.
    pub async fn evaluate(&self, market: &MarketSnapshot) -> EdgeVerdict {
        let market = market.sanitized();
        let span = info_span!("evaluate", market_id = %market.id);

        async move {
            let question = market.question_text.as_str();
            let social_keywords = social::keywords(question);
            let community_keywords = community::keywords(question);
            let news_keywords = news::keywords(question);
            debug!(
                "keywords: social={:?} community={:?} news={:?}",
                social_keywords, community_keywords, news_keywords
            );

            let transport = self.transport.as_ref();
            let (social_fetch, community_fetch, news_fetch) = tokio::join!(
                social::fetch(transport, &self.sources, &social_keywords),
                community::fetch(transport, &self.sources, &community_keywords),
                news::fetch(transport, &self.sources, &news_keywords),
            );

            let now = Utc::now();
            let signal = aggregate(
                summarize_source(SignalSource::Social, &social_fetch, now),
                summarize_source(SignalSource::Community, &community_fetch, now),
                summarize_source(SignalSource::News, &news_fetch, now),
            );

            let verdict = compute_edge(&market, signal);

            info!(
                "score={} label={} edge={:?}/{} action={:?} samples={}/{}/{}",
                verdict.signal.score,
                verdict.signal.overall_label.display(),
                verdict.edge_type,
                verdict.edge_score,
                verdict.suggested_action,
                verdict.signal.source_signals[0].sample_size,
                verdict.signal.source_signals[1].sample_size,
                verdict.signal.source_signals[2].sample_size,
            );

            verdict
        }
        .instrument(span)
        .await
    }

    /// Evaluate many markets with at most `concurrency` in flight.
    /// Output order matches input order.
    pub async fn evaluate_many(&self, markets: &[MarketSnapshot], concurrency: usize) -> Vec<EdgeVerdict> {
        stream::iter(markets)
            .map(|market| self.evaluate(market))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
