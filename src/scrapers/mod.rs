//! News site scrapers.
//!
//! Each scraper turns one article URL into an [`Article`](crate::models::Article):
//!
//! 1. **Fetching**: download the page with the shared [`http_client`]
//! 2. **Parsing**: pull the title, publication date and body paragraphs out of the HTML
//!
//! Parsing never fails. Missing pieces degrade to a default title, no date,
//! or an empty paragraph list; only network and HTTP status errors surface.
//!
//! # Supported Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Amnesty International | [`amnesty`] | News pages under `amnesty.org/en/latest/news/` |

pub mod amnesty;

use crate::error::Result;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;

/// Desktop browser user agent; some news sites serve bots a stripped page.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for article downloads: browser headers, fixed timeout, no retries.
pub fn http_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()?;
    Ok(client)
}
