//! Ordered fallback chains.
//!
//! Each source builds an explicit list of attempts (endpoint A, then B,
//! then C). Attempts run sequentially and the chain stops at the first
//! one that produces at least one item.

use std::sync::Arc;
use std::time::Duration;

use common::{Error, RawItem};
use tracing::{debug, warn};

use crate::transport::{FetchRequest, HttpFetch};

/// Turns a response body into items.
pub type Parser = Arc<dyn Fn(&str) -> Result<Vec<RawItem>, Error> + Send + Sync>;

/// One step in a fallback chain.
#[derive(Clone)]
pub struct Attempt {
    /// Short label for logs (instance host, forum name, query variant).
    pub label: String,
    pub request: FetchRequest,
    pub parser: Parser,
}

impl Attempt {
    pub fn new<F>(label: impl Into<String>, request: FetchRequest, parser: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<RawItem>, Error> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            request,
            parser: Arc::new(parser),
        }
    }
}

/// What a source fetcher hands to the scorer.
#[derive(Debug, Clone, Default)]
pub struct SourceFetch {
    pub items: Vec<RawItem>,
    /// Keywords used to build the queries.
    pub keywords: Vec<String>,
    /// Number of attempts actually executed.
    pub attempts: usize,
    /// Label of the attempt that produced `items`.
    pub succeeded_with: Option<String>,
    /// Most recent failure, kept for the source summary.
    pub last_error: Option<String>,
}

impl SourceFetch {
    /// An empty fetch that never touched the network.
    pub fn skipped(keywords: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            keywords,
            last_error: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Run attempts in order; stop at the first non-empty result.
///
/// Never fails: every transport, timeout, or parse error is recorded in
/// `last_error` and the next attempt is tried.
pub async fn run_chain(
    source_name: &'static str,
    transport: &dyn HttpFetch,
    attempts: Vec<Attempt>,
    timeout: Duration,
    cap: usize,
) -> SourceFetch {
    let mut outcome = SourceFetch::default();

    for attempt in attempts {
        outcome.attempts += 1;

        let body = match tokio::time::timeout(timeout, transport.get_text(&attempt.request)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                debug!("{}: attempt '{}' failed: {}", source_name, attempt.label, e);
                outcome.last_error = Some(e.to_string());
                continue;
            }
            Err(_) => {
                let e = Error::Timeout(timeout.as_millis() as u64);
                debug!("{}: attempt '{}' timed out", source_name, attempt.label);
                outcome.last_error = Some(e.to_string());
                continue;
            }
        };

        match (attempt.parser)(&body) {
            Ok(items) if !items.is_empty() => {
                debug!(
                    "{}: '{}' returned {} items",
                    source_name,
                    attempt.label,
                    items.len()
                );
                outcome.items = items.into_iter().take(cap).collect();
                outcome.succeeded_with = Some(attempt.label);
                return outcome;
            }
            Ok(_) => {
                debug!("{}: '{}' returned no items", source_name, attempt.label);
            }
            Err(e) => {
                debug!("{}: '{}' parse error: {}", source_name, attempt.label, e);
                outcome.last_error = Some(e.to_string());
            }
        }
    }

    if outcome.attempts > 0 {
        warn!(
            "{}: all {} attempts exhausted without results{}",
            source_name,
            outcome.attempts,
            outcome
                .last_error
                .as_deref()
                .map(|e| format!(" (last error: {})", e))
                .unwrap_or_default()
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse_rss;
    use crate::transport::stub::StubFetch;
    use crate::transport::ACCEPT_RSS;
    use async_trait::async_trait;

    const ONE_ITEM: &str = "<rss><item><title>hello</title></item></rss>";

    fn rss_attempt(url: &str) -> Attempt {
        Attempt::new(url, FetchRequest::get(url, ACCEPT_RSS), |body: &str| Ok(parse_rss(body)))
    }

    fn items_of(n: usize) -> String {
        let body: String = (0..n)
            .map(|i| format!("<item><title>post {}</title></item>", i))
            .collect();
        format!("<rss>{}</rss>", body)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let stub = StubFetch::new()
            .fail("https://a", "503")
            .ok("https://b", ONE_ITEM)
            .ok("https://c", ONE_ITEM);

        let attempts = vec![rss_attempt("https://a"), rss_attempt("https://b"), rss_attempt("https://c")];
        let out = run_chain("test", &stub, attempts, Duration::from_secs(1), 20).await;

        assert_eq!(out.items.len(), 1);
        assert_eq!(out.attempts, 2);
        assert_eq!(out.succeeded_with.as_deref(), Some("https://b"));
        assert_eq!(stub.called_urls(), vec!["https://a", "https://b"]);
    }

    #[tokio::test]
    async fn test_empty_results_fall_through() {
        let stub = StubFetch::new()
            .ok("https://a", "<rss></rss>")
            .ok("https://b", ONE_ITEM);

        let out = run_chain(
            "test",
            &stub,
            vec![rss_attempt("https://a"), rss_attempt("https://b")],
            Duration::from_secs(1),
            20,
        )
        .await;

        assert_eq!(out.succeeded_with.as_deref(), Some("https://b"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_empty_not_error() {
        let stub = StubFetch::new().fail("https://a", "dns failure");

        let out = run_chain(
            "test",
            &stub,
            vec![rss_attempt("https://a"), rss_attempt("https://b")],
            Duration::from_secs(1),
            20,
        )
        .await;

        assert!(out.is_empty());
        assert_eq!(out.attempts, 2);
        assert!(out.last_error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_cap_applied() {
        let body = items_of(30);
        let stub = StubFetch::new().ok("https://a", &body);

        let out = run_chain("test", &stub, vec![rss_attempt("https://a")], Duration::from_secs(1), 20).await;
        assert_eq!(out.items.len(), 20);
        assert_eq!(out.items[0].title, "post 0");
    }

    struct SlowFetch;

    #[async_trait]
    impl HttpFetch for SlowFetch {
        async fn get_text(&self, _request: &FetchRequest) -> Result<String, Error> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ONE_ITEM.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let out = run_chain(
            "test",
            &SlowFetch,
            vec![rss_attempt("https://slow")],
            Duration::from_secs(2),
            20,
        )
        .await;

        assert!(out.is_empty());
        assert_eq!(out.last_error.as_deref(), Some("Timed out after 2000ms"));
    }
}
