//! Crawl pass behavior over a scripted page source
//!
//! Exercises the engine end to end against a temporary SQLite store: per-id
//! failure isolation, comment parsing on the write path and idempotence of
//! repeated passes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::{TempDir, tempdir};

use cardbuff::application::CrawlEngine;
use cardbuff::domain::page_source::{CardPage, CardPageFetch, CardPageSource};
use cardbuff::infrastructure::{CardRepository, DatabaseConnection};

struct ScriptedSource {
    pages: HashMap<i64, CardPageFetch>,
}

#[async_trait]
impl CardPageSource for ScriptedSource {
    async fn fetch_card_page(&self, card_id: i64) -> CardPageFetch {
        self.pages
            .get(&card_id)
            .cloned()
            .unwrap_or(CardPageFetch::NotFound)
    }
}

fn found(name: &str, comment_blocks: &[&str]) -> CardPageFetch {
    CardPageFetch::Found(CardPage {
        name: name.to_string(),
        image_url: format!("https://mangabuff.ru/img/cards/{name}.webp"),
        comment_blocks: comment_blocks.iter().map(|c| c.to_string()).collect(),
    })
}

async fn test_repository() -> (CardRepository, TempDir) {
    let temp_dir = tempdir().unwrap();
    let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
    let db = DatabaseConnection::new(&url).await.unwrap();
    db.migrate().await.unwrap();
    (CardRepository::new(db.pool().clone()), temp_dir)
}

fn engine(pages: HashMap<i64, CardPageFetch>, repository: CardRepository, end_id: i64) -> CrawlEngine {
    CrawlEngine::new(Arc::new(ScriptedSource { pages }), repository, 1, end_id, 0)
}

/// Content-level view of the store: card fields plus comment fields, without
/// surrogate ids or row timestamps
async fn snapshot(
    repo: &CardRepository,
) -> Vec<(i64, String, String, Vec<(String, String, String, String)>)> {
    let mut out = Vec::new();
    let max_id = repo.max_card_id().await.unwrap().unwrap_or(0);
    for id in 1..=max_id {
        if let Some(card) = repo.get_card(id).await.unwrap() {
            let comments = repo
                .get_comments(id)
                .await
                .unwrap()
                .into_iter()
                .map(|c| (c.tag, c.author, c.posted_at, c.body))
                .collect();
            out.push((card.id, card.name, card.image_url, comments));
        }
    }
    out
}

#[tokio::test]
async fn test_one_bad_id_never_stops_the_walk() {
    let (repo, _guard) = test_repository().await;
    let pages = HashMap::from([
        (1, found("One", &[])),
        // 2 is absent from the map: the not-found path
        (3, CardPageFetch::TransientError("connection reset".to_string())),
        (4, found("Four", &[])),
    ]);

    let stats = engine(pages, repo.clone(), 4).execute().await.unwrap();

    assert_eq!(stats.processed, 4);
    assert_eq!(stats.saved, 2);
    assert_eq!(stats.skipped_missing, 1);
    assert_eq!(stats.failed, 1);

    assert!(repo.get_card(1).await.unwrap().is_some());
    assert!(repo.get_card(2).await.unwrap().is_none());
    assert!(repo.get_card(3).await.unwrap().is_none());
    assert!(repo.get_card(4).await.unwrap().is_some());
}

#[tokio::test]
async fn test_comment_blocks_are_parsed_on_the_write_path() {
    let (repo, _guard) = test_repository().await;
    let pages = HashMap::from([(
        1,
        found(
            "One",
            &[
                "[VIP]\nAlice\n2024-01-01\n0\nотдам за 3с\nОтветить",
                "коротко",
            ],
        ),
    )]);

    engine(pages, repo.clone(), 1).execute().await.unwrap();

    let comments = repo.get_comments(1).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].tag, "[VIP]");
    assert_eq!(comments[0].author, "Alice");
    assert_eq!(comments[0].posted_at, "2024-01-01");
    assert_eq!(comments[0].body, "отдам за 3с");
    // short block degrades to whole-block body
    assert_eq!(comments[1].tag, "");
    assert_eq!(comments[1].body, "коротко");
}

#[tokio::test]
async fn test_repeated_pass_leaves_the_store_unchanged() {
    let (repo, _guard) = test_repository().await;
    let pages = HashMap::from([
        (1, found("One", &["Bob\nвчера\n2\nменяю на 2а\nОтветить"])),
        (3, found("Three", &[])),
    ]);

    let first = engine(pages.clone(), repo.clone(), 3)
        .execute()
        .await
        .unwrap();
    let after_first = snapshot(&repo).await;

    let second = engine(pages, repo.clone(), 3).execute().await.unwrap();
    let after_second = snapshot(&repo).await;

    assert_eq!(first.saved, 2);
    assert_eq!(second.saved, 2);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_refetched_card_overwrites_instead_of_merging() {
    let (repo, _guard) = test_repository().await;

    let before = HashMap::from([(
        1,
        found("Old Name", &["a\nвчера\n1\nотдам за 2с\nОтветить"]),
    )]);
    engine(before, repo.clone(), 1).execute().await.unwrap();

    let after = HashMap::from([(1, found("New Name", &[]))]);
    engine(after, repo.clone(), 1).execute().await.unwrap();

    let card = repo.get_card(1).await.unwrap().unwrap();
    assert_eq!(card.name, "New Name");
    assert!(repo.get_comments(1).await.unwrap().is_empty());
}
