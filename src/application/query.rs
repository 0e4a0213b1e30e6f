//! Query surface for the card bot
//!
//! Transport-agnostic: turns one inbound text into one reply. Input is
//! validated against the highest card id known at service construction, so
//! a card crawled after the bot started is rejected until restart.

use anyhow::Result;
use tracing::warn;

use crate::domain::card::card_url;
use crate::domain::rank::RankEstimator;
use crate::infrastructure::card_repository::CardRepository;

/// Reply the transport should deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardReply {
    Text(String),
    Photo { url: String, caption: String },
}

pub struct QueryService {
    repository: CardRepository,
    estimator: RankEstimator,
    base_url: String,
    max_card_id: i64,
}

impl QueryService {
    /// Reads the highest stored card id once; it bounds valid queries for
    /// the life of the service.
    pub async fn new(
        repository: CardRepository,
        estimator: RankEstimator,
        base_url: String,
    ) -> Result<Self> {
        let max_card_id = repository.max_card_id().await?.unwrap_or(0);
        Ok(Self {
            repository,
            estimator,
            base_url,
            max_card_id,
        })
    }

    pub fn max_card_id(&self) -> i64 {
        self.max_card_id
    }

    /// Static /start reply naming the highest known card id
    pub fn greeting(&self) -> String {
        format!(
            "Привет! Отправь номер карты от 1 до {}, и я покажу её с оценкой стоимости по комментариям.",
            self.max_card_id
        )
    }

    /// One inbound message to one reply
    pub async fn handle_text(&self, text: &str) -> CardReply {
        let card_id = match text.trim().parse::<i64>() {
            Ok(id) if id > 0 && id <= self.max_card_id => id,
            _ => return self.validation_reply(),
        };

        let card = match self.repository.get_card(card_id).await {
            Ok(Some(card)) => card,
            Ok(None) => return self.not_found_reply(card_id),
            Err(e) => {
                warn!("Card {}: lookup failed: {:#}", card_id, e);
                return self.not_found_reply(card_id);
            }
        };

        let estimate = match self.repository.list_comment_bodies(card_id).await {
            Ok(bodies) => self.estimator.most_common_rank(&bodies.join("\n")),
            Err(e) => {
                warn!("Card {}: comment read failed: {:#}", card_id, e);
                None
            }
        };

        let caption = format!(
            "Карта №{}: {}\nОценка стоимости: `{}`\n{}",
            card.id,
            card.name,
            estimate.as_deref().unwrap_or("не определена"),
            card.public_url(&self.base_url)
        );
        CardReply::Photo {
            url: card.image_url,
            caption,
        }
    }

    fn validation_reply(&self) -> CardReply {
        CardReply::Text(format!(
            "Отправь число от 1 до {}.",
            self.max_card_id
        ))
    }

    fn not_found_reply(&self, card_id: i64) -> CardReply {
        CardReply::Text(format!(
            "Карты №{} нет в базе - возможно, она удалена. Проверить вручную: {}",
            card_id,
            card_url(&self.base_url, card_id)
        ))
    }
}
