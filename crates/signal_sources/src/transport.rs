//! HTTP transport seam for source fetchers.
//!
//! Fetchers only ever see `dyn HttpFetch`, so tests can swap the network
//! for canned payloads.

use std::time::Duration;

use async_trait::async_trait;
use common::{format_error_chain, summarize_body, Error};
use tracing::debug;

pub const ACCEPT_RSS: &str = "application/rss+xml, application/xml;q=0.9, */*;q=0.8";
pub const ACCEPT_JSON: &str = "application/json";

/// A single GET request against a source endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub accept: &'static str,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>, accept: &'static str) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            accept,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal read-only HTTP client used by the fetchers.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform the request and return the body of a 2xx response.
    async fn get_text(&self, request: &FetchRequest) -> Result<String, Error>;
}

/// `reqwest`-backed transport with connection pooling.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build source HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get_text(&self, request: &FetchRequest) -> Result<String, Error> {
        debug!("GET {} {:?}", request.url, request.query);

        let resp = self
            .client
            .get(&request.url)
            .query(&request.query)
            .header("Accept", request.accept)
            .send()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "{} returned {}: {}",
                request.url,
                status.as_u16(),
                summarize_body(&body)
            )));
        }

        resp.text()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! In-memory transport for tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Routes requests by `url` (plus an optional `q` parameter) to canned
    /// bodies. Unrouted requests fail like a dead host.
    #[derive(Default)]
    pub struct StubFetch {
        routes: HashMap<String, Result<String, String>>,
        pub calls: Mutex<Vec<FetchRequest>>,
    }

    impl StubFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(mut self, key: &str, body: &str) -> Self {
            self.routes.insert(key.to_string(), Ok(body.to_string()));
            self
        }

        pub fn fail(mut self, key: &str, message: &str) -> Self {
            self.routes.insert(key.to_string(), Err(message.to_string()));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn called_urls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|r| r.url.clone()).collect()
        }
    }

    #[async_trait]
    impl HttpFetch for StubFetch {
        async fn get_text(&self, request: &FetchRequest) -> Result<String, Error> {
            self.calls.lock().unwrap().push(request.clone());

            let keyed = request
                .query_value("q")
                .map(|q| format!("{}?q={}", request.url, q));
            let route = keyed
                .as_ref()
                .and_then(|k| self.routes.get(k))
                .or_else(|| self.routes.get(&request.url));

            match route {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(msg)) => Err(Error::Http(msg.clone())),
                None => Err(Error::Http(format!("connection refused: {}", request.url))),
            }
        }
    }
}
