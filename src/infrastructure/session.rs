//! Cookie cache for the authenticated crawl session
//!
//! Interactive login happens in external browser tooling; it leaves behind a
//! JSON array of cookie objects that every crawler run restores into the
//! request session. A crawl cannot start without this file.

use anyhow::{Context, Result, bail};
use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One browser-exported cookie. Extra fields in the file (expiry, secure,
/// httpOnly) are ignored on load and omitted on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Load the cookie cache file written after interactive login
pub fn load_cookies(path: &Path) -> Result<Vec<CookieRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cookie file {}", path.display()))?;
    let cookies: Vec<CookieRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Cookie file {} is not a JSON cookie array", path.display()))?;
    info!("{} cookies loaded from {}", cookies.len(), path.display());
    Ok(cookies)
}

/// Write the cookie cache file, keeping only the named cookies when a filter
/// is given (the login flow saves just the session-bearing ones)
pub fn save_cookies(
    path: &Path,
    cookies: &[CookieRecord],
    required_names: Option<&[String]>,
) -> Result<()> {
    let filtered: Vec<&CookieRecord> = cookies
        .iter()
        .filter(|c| required_names.is_none_or(|names| names.iter().any(|n| n == &c.name)))
        .collect();

    let raw = serde_json::to_string_pretty(&filtered)?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write cookie file {}", path.display()))?;
    info!("{} cookies saved to {}", filtered.len(), path.display());
    Ok(())
}

/// Fail unless every required session cookie is present
pub fn ensure_required(cookies: &[CookieRecord], required_names: &[String]) -> Result<()> {
    for name in required_names {
        if !cookies.iter().any(|c| &c.name == name) {
            bail!(
                "Required cookie '{}' is missing; log in via the browser tooling and re-export the cookie file",
                name
            );
        }
    }
    Ok(())
}

/// Build a reqwest cookie jar scoped to the site
pub fn build_cookie_jar(cookies: &[CookieRecord], base_url: &str) -> Result<Arc<Jar>> {
    let url = reqwest::Url::parse(base_url)
        .with_context(|| format!("Invalid base url {base_url}"))?;
    let default_domain = url
        .host_str()
        .with_context(|| format!("Base url {base_url} has no host"))?
        .to_string();

    let jar = Jar::default();
    for cookie in cookies {
        let domain = cookie.domain.as_deref().unwrap_or(&default_domain);
        let path = cookie.path.as_deref().unwrap_or("/");
        let header = format!(
            "{}={}; Domain={}; Path={}",
            cookie.name,
            cookie.value,
            domain.trim_start_matches('.'),
            path
        );
        jar.add_cookie_str(&header, &url);
    }
    Ok(Arc::new(jar))
}
