//! Repository for card and comment persistence
//!
//! The write path is insert-or-replace for cards plus a transactional
//! delete-then-insert for a card's comments, so repeated crawls of the same
//! id never accumulate duplicates and readers never observe a half-replaced
//! comment set.

use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::domain::card::{Card, Comment, NewComment};

#[derive(Clone)]
pub struct CardRepository {
    pool: Arc<SqlitePool>,
}

impl CardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Insert or fully overwrite the card row keyed by `card_id`
    pub async fn upsert_card(&self, card_id: i64, name: &str, image_url: &str) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO cards (id, name, image_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(card_id)
        .bind(name)
        .bind(image_url)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Atomically replace the card's comment set, preserving input order.
    ///
    /// Delete and re-insert run in one transaction; a concurrent reader sees
    /// either the old set or the new set, never the gap between them.
    pub async fn replace_comments(&self, card_id: i64, comments: &[NewComment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE card_id = ?")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;

        for comment in comments {
            sqlx::query(
                r#"
                INSERT INTO comments (card_id, tag, author, posted_at, body)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(card_id)
            .bind(&comment.tag)
            .bind(&comment.author)
            .bind(&comment.posted_at)
            .bind(&comment.body)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_card(&self, card_id: i64) -> Result<Option<Card>> {
        let row = sqlx::query(
            "SELECT id, name, image_url, created_at, updated_at FROM cards WHERE id = ?",
        )
        .bind(card_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|row| Card {
            id: row.get("id"),
            name: row.get("name"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    /// Full comment rows for one card, in stored order
    pub async fn get_comments(&self, card_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, card_id, tag, author, posted_at, body FROM comments WHERE card_id = ? ORDER BY id",
        )
        .bind(card_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Comment {
                id: row.get("id"),
                card_id: row.get("card_id"),
                tag: row.get("tag"),
                author: row.get("author"),
                posted_at: row.get("posted_at"),
                body: row.get("body"),
            })
            .collect())
    }

    /// Comment bodies for one card, the read path of the rank estimator
    pub async fn list_comment_bodies(&self, card_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT body FROM comments WHERE card_id = ? ORDER BY id")
            .bind(card_id)
            .fetch_all(&*self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("body")).collect())
    }

    /// Highest card id in the store, None while the store is empty
    pub async fn max_card_id(&self) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT MAX(id) AS max_id FROM cards")
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.get("max_id"))
    }

    pub async fn count_cards(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM cards")
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
