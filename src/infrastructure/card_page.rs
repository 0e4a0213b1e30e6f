//! Card page fetch and extraction
//!
//! Maps one card id to the rendered page's name, art and raw comment
//! blocks. The card name is the page title with a fixed-length prefix
//! removed; the art element's absence is the "likely deleted" signal. No
//! status-code branch exists anywhere on this path.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::card::card_url;
use crate::domain::page_source::{CardPage, CardPageFetch, CardPageSource};
use crate::infrastructure::http_client::HttpClient;

const TITLE_SELECTOR: &str = "title";
const IMAGE_SELECTOR: &str = ".card-show__image";
const COMMENT_SELECTOR: &str = ".comments__item";

/// Extraction failures. Image lookups double as the deletion signal; the
/// rest surface as unexpected per-card errors.
#[derive(Error, Debug, Clone)]
pub enum ExtractError {
    #[error("page has no <title> element")]
    TitleMissing,

    #[error("image element '{selector}' not found")]
    ImageMissing { selector: String },

    #[error("image element has no src attribute")]
    ImageSrcMissing,

    #[error("image src '{src}' does not resolve against the base url")]
    ImageSrcInvalid { src: String },
}

/// HTTP-backed implementation of the page-source boundary
pub struct HttpCardPageSource {
    http: HttpClient,
    base: Url,
    /// Characters of the page title that belong to the site-wide prefix,
    /// not the card name
    title_prefix_chars: usize,
    title_selector: Selector,
    image_selector: Selector,
    comment_selector: Selector,
}

impl HttpCardPageSource {
    pub fn new(http: HttpClient, base_url: &str, title_prefix_chars: usize) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid base url {base_url}"))?;
        Ok(Self {
            http,
            base,
            title_prefix_chars,
            title_selector: parse_selector(TITLE_SELECTOR)?,
            image_selector: parse_selector(IMAGE_SELECTOR)?,
            comment_selector: parse_selector(COMMENT_SELECTOR)?,
        })
    }

    fn extract(&self, body: &str) -> Result<CardPage, ExtractError> {
        let document = Html::parse_document(body);

        let title: String = document
            .select(&self.title_selector)
            .next()
            .ok_or(ExtractError::TitleMissing)?
            .text()
            .collect();
        let name: String = title.chars().skip(self.title_prefix_chars).collect();

        let image = document
            .select(&self.image_selector)
            .next()
            .ok_or_else(|| ExtractError::ImageMissing {
                selector: IMAGE_SELECTOR.to_string(),
            })?;
        let src = image
            .value()
            .attr("src")
            .ok_or(ExtractError::ImageSrcMissing)?;
        let image_url = self
            .base
            .join(src)
            .map_err(|_| ExtractError::ImageSrcInvalid {
                src: src.to_string(),
            })?
            .to_string();

        let comment_blocks: Vec<String> = document
            .select(&self.comment_selector)
            .map(|element| {
                // approximate the rendered text: one line per text node
                element
                    .text()
                    .map(str::trim)
                    .filter(|fragment| !fragment.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();

        Ok(CardPage {
            name,
            image_url,
            comment_blocks,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{}': {}", selector, e))
}

#[async_trait]
impl CardPageSource for HttpCardPageSource {
    async fn fetch_card_page(&self, card_id: i64) -> CardPageFetch {
        let url = card_url(self.base.as_str(), card_id);
        let body = match self.http.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => return CardPageFetch::TransientError(format!("{e:#}")),
        };

        match self.extract(&body) {
            Ok(page) => CardPageFetch::Found(page),
            Err(e @ (ExtractError::ImageMissing { .. } | ExtractError::ImageSrcMissing)) => {
                debug!("Card {}: {}", card_id, e);
                CardPageFetch::NotFound
            }
            Err(e) => CardPageFetch::TransientError(e.to_string()),
        }
    }
}
