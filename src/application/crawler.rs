//! Sequential crawl engine
//!
//! Walks the configured card id range in ascending order, one card fully
//! processed before the next. Every failure is contained to its id: a page
//! without the expected elements, an unexpected fetch error or a failed
//! write each log and move on. A fixed delay follows every id, success or
//! failure, to bound the request rate against the site.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::domain::card::NewComment;
use crate::domain::comment_parser::parse_comment_block;
use crate::domain::page_source::{CardPage, CardPageFetch, CardPageSource};
use crate::infrastructure::card_repository::CardRepository;

/// Outcome counters for one crawl pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Ids walked, successful or not
    pub processed: u64,
    /// Cards written to the store
    pub saved: u64,
    /// Ids whose page lacked the expected elements (likely deleted upstream)
    pub skipped_missing: u64,
    /// Ids lost to unexpected fetch or persistence errors
    pub failed: u64,
}

pub struct CrawlEngine {
    source: Arc<dyn CardPageSource>,
    repository: CardRepository,
    start_id: i64,
    end_id: i64,
    request_delay: Duration,
}

impl CrawlEngine {
    pub fn new(
        source: Arc<dyn CardPageSource>,
        repository: CardRepository,
        start_id: i64,
        end_id: i64,
        request_delay_ms: u64,
    ) -> Self {
        Self {
            source,
            repository,
            start_id,
            end_id,
            request_delay: Duration::from_millis(request_delay_ms),
        }
    }

    /// One full pass over `[start_id, end_id]`.
    ///
    /// There is no checkpoint: every run re-walks the whole range. Card
    /// writes are insert-or-replace and the comment set is replaced
    /// wholesale, so a repeated pass over an unchanged site leaves the
    /// store unchanged.
    pub async fn execute(&self) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        info!(
            "Starting crawl pass over cards {}..={}",
            self.start_id, self.end_id
        );

        for card_id in self.start_id..=self.end_id {
            stats.processed += 1;

            match self.source.fetch_card_page(card_id).await {
                CardPageFetch::Found(page) => match self.persist(card_id, &page).await {
                    Ok(()) => {
                        stats.saved += 1;
                        info!(
                            "Card {}: saved '{}' with {} comments",
                            card_id,
                            page.name,
                            page.comment_blocks.len()
                        );
                    }
                    Err(e) => {
                        stats.failed += 1;
                        error!("Card {}: persistence failed: {:#}", card_id, e);
                    }
                },
                CardPageFetch::NotFound => {
                    stats.skipped_missing += 1;
                    info!("Card {}: likely deleted, skipping", card_id);
                }
                CardPageFetch::TransientError(reason) => {
                    stats.failed += 1;
                    warn!("Card {}: unexpected error, skipping: {}", card_id, reason);
                }
            }

            sleep(self.request_delay).await;
        }

        info!(
            "Crawl pass finished: {} processed, {} saved, {} missing, {} failed",
            stats.processed, stats.saved, stats.skipped_missing, stats.failed
        );
        Ok(stats)
    }

    /// Card row first, then its comment set, so every stored comment always
    /// references an existing card
    async fn persist(&self, card_id: i64, page: &CardPage) -> Result<()> {
        let comments: Vec<NewComment> = page
            .comment_blocks
            .iter()
            .map(|block| parse_comment_block(block))
            .collect();

        self.repository
            .upsert_card(card_id, &page.name, &page.image_url)
            .await?;
        self.repository.replace_comments(card_id, &comments).await?;
        Ok(())
    }
}
