//! Short-form social posts via Nitter search RSS.
//!
//! Nitter mirrors come and go, so every configured instance is tried in
//! order and the first one returning posts wins.

use std::time::Duration;

use common::config::SourcesConfig;
use common::{Error, RawItem};

use crate::chain::{run_chain, Attempt, SourceFetch};
use crate::feed::{parse_rss, strip_author_prefix};
use crate::keywords::{extract_keywords, KeywordProfile};
use crate::transport::{FetchRequest, HttpFetch, ACCEPT_RSS};

pub const SOURCE_NAME: &str = "social";
pub const RESULT_CAP: usize = 20;

pub fn keywords(question: &str) -> Vec<String> {
    extract_keywords(question, &KeywordProfile::SOCIAL)
}

/// `kw1 OR kw2 OR kw3`
pub fn build_query(keywords: &[String]) -> String {
    keywords.join(" OR ")
}

fn parse_posts(body: &str) -> Result<Vec<RawItem>, Error> {
    Ok(parse_rss(body)
        .into_iter()
        .map(|mut item| {
            item.title = strip_author_prefix(&item.title);
            item
        })
        .collect())
}

/// One attempt per mirror instance, in configured order.
pub fn attempts(cfg: &SourcesConfig, keywords: &[String]) -> Vec<Attempt> {
    let query = build_query(keywords);

    cfg.nitter_instances
        .iter()
        .map(|instance| {
            let url = format!("{}/search/rss", instance.trim_end_matches('/'));
            let request = FetchRequest::get(url, ACCEPT_RSS)
                .param("f", "tweets")
                .param("q", query.clone());
            Attempt::new(instance.clone(), request, parse_posts)
        })
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::StubFetch;

    fn feed() -> &'static str {
        r#"<rss><channel>
            <item><title>whale_alert: Bitcoin breakout, bulls in control</title>
                  <pubDate>Wed, 12 Feb 2025 10:00:00 GMT</pubDate></item>
            <item><title>trader: bitcoin dump incoming</title></item>
        </channel></rss>"#
    }

    fn cfg() -> SourcesConfig {
        SourcesConfig {
            nitter_instances: vec!["https://n1.example".into(), "https://n2.example/".into()],
            ..SourcesConfig::default()
        }
    }

    #[test]
    fn test_attempts_follow_instance_order() {
        let kws = keywords("Will Bitcoin exceed $150,000 by March 2025?");
        let attempts = attempts(&cfg(), &kws);

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].request.url, "https://n1.example/search/rss");
        assert_eq!(attempts[1].request.url, "https://n2.example/search/rss");
        assert_eq!(
            attempts[0].request.query_value("q"),
            Some("bitcoin OR exceed OR march")
        );
        assert_eq!(attempts[0].request.query_value("f"), Some("tweets"));
    }

    #[tokio::test]
    async fn test_falls_back_to_second_instance() {
        let stub = StubFetch::new()
            .fail("https://n1.example/search/rss", "502 bad gateway")
            .ok("https://n2.example/search/rss", feed());

        let kws = keywords("Will Bitcoin exceed $150,000 by March 2025?");
        let out = fetch(&stub, &cfg(), &kws).await;

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].title, "Bitcoin breakout, bulls in control");
        assert_eq!(out.succeeded_with.as_deref(), Some("https://n2.example/"));
        assert_eq!(out.keywords, kws);
    }

    #[tokio::test]
    async fn test_no_keywords_skips_network() {
        let stub = StubFetch::new();
        let out = fetch(&stub, &cfg(), &[]).await;

        assert!(out.is_empty());
        assert_eq!(stub.call_count(), 0);
        assert!(out.last_error.is_some());
    }
}
