//! Rendering-collaborator boundary for card pages
//!
//! The crawl engine never touches HTTP or HTML directly; it asks a
//! `CardPageSource` for one card id at a time and branches on the outcome.
//! Absence of the expected page elements is the only "card not found"
//! signal - there is no status-code branch anywhere in the pipeline.

use async_trait::async_trait;

/// Raw data lifted from one rendered card page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPage {
    pub name: String,
    pub image_url: String,
    /// Rendered text of each comment widget, unparsed
    pub comment_blocks: Vec<String>,
}

/// Outcome of one page fetch
#[derive(Debug, Clone)]
pub enum CardPageFetch {
    Found(CardPage),
    /// Expected elements absent - the card was most likely deleted upstream
    NotFound,
    /// Network or extraction failure that is not a deletion signal
    TransientError(String),
}

/// One-card-at-a-time page access, implemented over HTTP in infrastructure
#[async_trait]
pub trait CardPageSource: Send + Sync {
    async fn fetch_card_page(&self, card_id: i64) -> CardPageFetch;
}
