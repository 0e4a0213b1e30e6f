use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog card as stored in the `cards` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Externally assigned numeric id, primary key on the site and here
    pub id: i64,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// One stored comment row attached to a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "cardId")]
    pub card_id: i64,
    /// Bracketed marker from the widget's first line, empty when absent
    pub tag: String,
    pub author: String,
    /// Display string exactly as rendered, never parsed into a date
    #[serde(rename = "postedAt")]
    pub posted_at: String,
    pub body: String,
}

/// Comment payload before it has been assigned a row id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub tag: String,
    pub author: String,
    pub posted_at: String,
    pub body: String,
}

impl Card {
    /// Public page for this card, the same page the crawler reads
    pub fn public_url(&self, base_url: &str) -> String {
        card_url(base_url, self.id)
    }
}

/// Public page URL for a card id
pub fn card_url(base_url: &str, card_id: i64) -> String {
    format!("{}/cards/{}/users", base_url.trim_end_matches('/'), card_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_url_trims_trailing_slash() {
        assert_eq!(
            card_url("https://mangabuff.ru/", 42),
            "https://mangabuff.ru/cards/42/users"
        );
        assert_eq!(
            card_url("https://mangabuff.ru", 42),
            "https://mangabuff.ru/cards/42/users"
        );
    }
}
