//! Community discussion threads via Reddit's public search JSON.

use std::time::Duration;

use common::config::SourcesConfig;

use crate::chain::{run_chain, Attempt, SourceFetch};
use crate::feed::parse_reddit_listing;
use crate::keywords::{extract_keywords, KeywordProfile};
use crate::transport::{FetchRequest, HttpFetch, ACCEPT_JSON};

pub const SOURCE_NAME: &str = "community";
pub const RESULT_CAP: usize = 25;

const FORUM_LIMIT: &str = "10";
const UNSCOPED_LIMIT: &str = "25";

pub fn keywords(question: &str) -> Vec<String> {
    extract_keywords(question, &KeywordProfile::COMMUNITY)
}

/// Forum-scoped searches over the first `max_forum_attempts` forums, then a
/// site-wide search as the last resort.
pub fn attempts(cfg: &SourcesConfig, keywords: &[String]) -> Vec<Attempt> {
    let base = cfg.community_base_url.trim_end_matches('/').to_string();
    let scoped_query = keywords.iter().take(2).cloned().collect::<Vec<_>>().join(" ");
    let unscoped_query = keywords.iter().take(3).cloned().collect::<Vec<_>>().join(" OR ");

    let mut attempts: Vec<Attempt> = cfg
        .forums
        .iter()
        .take(cfg.max_forum_attempts)
        .map(|forum| {
            let request = FetchRequest::get(format!("{}/r/{}/search.json", base, forum), ACCEPT_JSON)
                .param("q", scoped_query.clone())
                .param("restrict_sr", "1")
                .param("sort", "hot")
                .param("limit", FORUM_LIMIT)
                .param("t", "day");
            listing_attempt(format!("r/{}", forum), request, &base)
        })
        .collect();

    let request = FetchRequest::get(format!("{}/search.json", base), ACCEPT_JSON)
        .param("q", unscoped_query)
        .param("sort", "hot")
        .param("limit", UNSCOPED_LIMIT)
        .param("t", "day");
    attempts.push(listing_attempt("all", request, &base));

    attempts
}

fn listing_attempt(label: impl Into<String>, request: FetchRequest, base: &str) -> Attempt {
    let base = base.to_string();
    Attempt::new(label, request, move |body: &str| parse_reddit_listing(body, &base))
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
