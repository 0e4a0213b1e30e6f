//! Application layer - the two process workflows
//!
//! The crawl engine drives the write path and the query service drives the
//! read path. Both are wired from plain constructor arguments so the
//! binaries own every handle's lifecycle.

pub mod crawler;
pub mod query;

// Re-export commonly used items
pub use crawler::{CrawlEngine, CrawlStats};
pub use query::{CardReply, QueryService};
