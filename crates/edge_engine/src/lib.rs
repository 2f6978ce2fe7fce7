//! Edge engine crate.
//!
//! Turns public sentiment about a market question into an `EdgeVerdict`
//! comparing the signal with the market's quoted probability.

pub mod aggregator;
pub mod edge;
pub mod engine;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod sentiment;

pub use aggregator::aggregate;
pub use edge::{classify_edge, compute_edge, suggest_action, EdgeClassification};
pub use engine::EdgeEngine;
pub use sentiment::{score_text, summarize_source, Lexicon};
