//! Shared types, config, and error definitions for the Orakel edge engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{format_error_chain, summarize_body, Error};
pub use types::*;
