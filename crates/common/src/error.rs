//! Unified error type for the edge engine.

use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Polymarket API error: {0}")]
    Polymarket(String),

    #[error("Timed out after {0}ms")]
    Timeout(u64),
}

/// Render an error with its whole cause chain, so DNS/TLS/socket failures
/// are visible in a single line.
pub fn format_error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// One-line, length-capped view of an upstream error body.
pub fn summarize_body(raw: &str) -> String {
    const MAX_CHARS: usize = 300;
    let compact = raw.replace(['\n', '\r'], " ");
    match compact.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}…", &compact[..idx]),
        None => compact,
    }
}
