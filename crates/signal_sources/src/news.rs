//! News headlines via the Google News search RSS feed.
//!
//! Long questions often match nothing, so the query is progressively
//! narrowed (all keywords, then the first three, two, one) before a final
//! search on the lead keyword without the seven-day window.

use std::time::Duration;

use common::config::SourcesConfig;

use crate::chain::{run_chain, Attempt, SourceFetch};
use crate::feed::parse_rss;
use crate::keywords::{extract_keywords, KeywordProfile};
use crate::transport::{FetchRequest, HttpFetch, ACCEPT_RSS};

pub const SOURCE_NAME: &str = "news";
pub const RESULT_CAP: usize = 20;

const RECENCY_WINDOW: &str = "7d";

pub fn keywords(question: &str) -> Vec<String> {
    extract_keywords(question, &KeywordProfile::NEWS)
}

/// Distinct queries from widest to narrowest.
pub fn query_variants(keywords: &[String]) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();

    for take in [keywords.len(), 3, 2, 1] {
        let query = keywords.iter().take(take).cloned().collect::<Vec<_>>().join(" ");
        if !query.is_empty() && !variants.contains(&query) {
            variants.push(query);
        }
    }

    variants
}

fn search_request(base: &str, query: &str, windowed: bool) -> FetchRequest {
    let request = FetchRequest::get(format!("{}/rss/search", base), ACCEPT_RSS)
        .param("q", query)
        .param("hl", "en-US")
        .param("gl", "US")
        .param("ceid", "US:en");

    if windowed {
        request.param("when", RECENCY_WINDOW)
    } else {
        request
    }
}

pub fn attempts(cfg: &SourcesConfig, keywords: &[String]) -> Vec<Attempt> {
    let base = cfg.news_base_url.trim_end_matches('/');
    let variants = query_variants(keywords);

    let mut attempts: Vec<Attempt> = variants
        .iter()
        .map(|q| {
            Attempt::new(q.clone(), search_request(base, q, true), |body: &str| {
                Ok(parse_rss(body))
            })
        })
        .collect();

    // Lead keyword alone is the broadest query.
    if let Some(broad) = variants.last() {
        attempts.push(Attempt::new(
            format!("{} (any time)", broad),
            search_request(base, broad, false),
            |body: &str| Ok(parse_rss(body)),
        ));
    }

    attempts
}

pub async fn fetch(transport: &dyn HttpFetch, cfg: &SourcesConfig, keywords: &[String]) -> SourceFetch {
    if keywords.is_empty() {
        return SourceFetch::skipped(Vec::new(), "no searchable keywords in question");
    }

    let mut outcome = run_chain(
        SOURCE_NAME,
        transport,
        attempts(cfg, keywords),
        Duration::from_secs(cfg.attempt_timeout_secs),
        RESULT_CAP,
    )
    .await;
    outcome.keywords = keywords.to_vec();
    outcome
}
