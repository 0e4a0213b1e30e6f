//! Bot process: long-polls Telegram and answers card queries until
//! terminated.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use cardbuff::application::{CardReply, QueryService};
use cardbuff::domain::rank::{RankEstimator, RankVocabulary};
use cardbuff::infrastructure::logging::init_logging_with_config;
use cardbuff::infrastructure::{
    CardRepository, ConfigManager, DatabaseConnection, TelegramClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigManager::new()?.initialize_on_first_run().await?;
    init_logging_with_config(&config.logging)?;
    info!("cardbuff bot {} starting", env!("CARGO_PKG_VERSION"));

    let db = DatabaseConnection::new(&config.database_url()).await?;
    db.migrate().await?;
    let repository = CardRepository::new(db.pool().clone());

    let estimator = RankEstimator::new(&RankVocabulary::default_triggers())?;
    let service = QueryService::new(repository, estimator, config.crawling.base_url.clone()).await?;
    info!("Answering queries for cards 1..={}", service.max_card_id());

    let token = std::env::var(&config.telegram.token_env).with_context(|| {
        format!(
            "Bot token environment variable {} is not set",
            config.telegram.token_env
        )
    })?;
    let telegram = TelegramClient::new(&token, config.telegram.poll_timeout_seconds)?;

    let mut offset = 0i64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping");
                break;
            }
            updates = telegram.get_updates(offset) => {
                let updates = match updates {
                    Ok(updates) => updates,
                    Err(e) => {
                        warn!("getUpdates failed, retrying: {:#}", e);
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.message else { continue };
                    let Some(text) = message.text.as_deref() else { continue };
                    let chat_id = message.chat.id;

                    let reply = if text.trim() == "/start" {
                        CardReply::Text(service.greeting())
                    } else {
                        service.handle_text(text).await
                    };

                    let delivery = match &reply {
                        CardReply::Text(text) => telegram.send_message(chat_id, text).await,
                        CardReply::Photo { url, caption } => {
                            telegram.send_photo(chat_id, url, caption).await
                        }
                    };
                    if let Err(e) = delivery {
                        // one failed reply never stops the poll loop
                        error!("Reply to chat {} failed: {:#}", chat_id, e);
                    }
                }
            }
        }
    }

    db.pool().close().await;
    Ok(())
}
