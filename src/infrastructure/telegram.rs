//! Minimal Telegram Bot API transport
//!
//! Long-polls `getUpdates` and delivers text or photo replies in Markdown
//! mode. Only the handful of fields the query bot reads are deserialized;
//! the rest of the update payload is ignored.

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

pub struct TelegramClient {
    http: Client,
    api_base: String,
    poll_timeout_seconds: u64,
}

impl TelegramClient {
    pub fn new(token: &str, poll_timeout_seconds: u64) -> Result<Self> {
        // the HTTP timeout must outlive the server-side long-poll window
        let http = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_seconds + 10))
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            http,
            api_base: format!("https://api.telegram.org/bot{token}"),
            poll_timeout_seconds,
        })
    }

    /// Updates after `offset`, blocking until something arrives or the
    /// server-side poll timeout lapses
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout_seconds,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: Message = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: &str) -> Result<()> {
        let _: Message = self
            .call(
                "sendPhoto",
                &json!({
                    "chat_id": chat_id,
                    "photo": photo_url,
                    "caption": caption,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/{}", self.api_base, method);
        let response: ApiResponse<T> = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .with_context(|| format!("Telegram API request {method} failed"))?
            .json()
            .await
            .with_context(|| format!("Telegram API response for {method} is not JSON"))?;

        if !response.ok {
            bail!(
                "Telegram API {method} rejected: {}",
                response
                    .description
                    .unwrap_or_else(|| "no description".to_string())
            );
        }

        response
            .result
            .with_context(|| format!("Telegram API {method} returned ok without a result"))
    }
}
