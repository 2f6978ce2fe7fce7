//! Public-data fetchers for the three signal sources.
//!
//! Every fetcher walks an ordered list of endpoints and never surfaces an
//! error: a source that cannot be reached simply contributes no items.

pub mod chain;
pub mod community;
pub mod feed;
pub mod keywords;
pub mod news;
pub mod social;
pub mod transport;

pub use chain::{run_chain, Attempt, SourceFetch};
pub use transport::{FetchRequest, HttpFetch, ReqwestFetch};
