//! Crawler process: one sequential pass over the configured card range.
//!
//! Startup is fatal only when the cookie cache is missing or incomplete;
//! everything after that is contained per card id by the engine.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use cardbuff::application::CrawlEngine;
use cardbuff::infrastructure::logging::init_logging_with_config;
use cardbuff::infrastructure::session;
use cardbuff::infrastructure::{
    CardRepository, ConfigManager, DatabaseConnection, HttpCardPageSource, HttpClient,
    HttpClientConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigManager::new()?.initialize_on_first_run().await?;
    init_logging_with_config(&config.logging)?;
    info!("cardbuff crawler {} starting", env!("CARGO_PKG_VERSION"));

    let db = DatabaseConnection::new(&config.database_url()).await?;
    db.migrate().await?;
    let repository = CardRepository::new(db.pool().clone());

    // the one fatal startup error: without the cookie cache there is no
    // authenticated session to crawl with
    let cookies = session::load_cookies(Path::new(&config.crawling.cookies_file))
        .context("Cookie cache missing or unreadable - run the browser login tooling first")?;
    session::ensure_required(&cookies, &config.crawling.required_cookies)?;
    let jar = session::build_cookie_jar(&cookies, &config.crawling.base_url)?;

    let http = HttpClient::with_cookie_jar(
        HttpClientConfig {
            timeout_seconds: config.crawling.request_timeout_seconds,
            max_retries: config.crawling.max_retries,
            user_agent: config.crawling.user_agent.clone(),
        },
        jar,
    )?;
    let source = HttpCardPageSource::new(
        http,
        &config.crawling.base_url,
        config.crawling.title_prefix_chars,
    )?;

    let engine = CrawlEngine::new(
        Arc::new(source),
        repository,
        config.crawling.start_id,
        config.crawling.end_id,
        config.crawling.request_delay_ms,
    );
    let stats = engine.execute().await?;

    info!(
        "Crawler exiting: {} saved, {} missing, {} failed of {} processed",
        stats.saved, stats.skipped_missing, stats.failed, stats.processed
    );
    db.pool().close().await;
    Ok(())
}
