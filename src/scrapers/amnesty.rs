//! Amnesty International news article scraper.
//!
//! Article pages carry the headline in the first `<h1>`, the publication date
//! in a `<time datetime="...">` element, and the story inside a
//! `div.rich-text` (older layouts: `div.article-body`, or a bare `<article>`).

use crate::error::Result;
use crate::models::Article;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_TITLE: &str = "Untitled";

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static DIV_WITH_CLASS: Lazy<Selector> = Lazy::new(|| Selector::parse("div[class]").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static BODY_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(rich-text|article-body)").unwrap());
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}\s\w+\s\d{4}\b").unwrap());

/// Download an article page.
///
/// # Errors
///
/// Fails on malformed URLs, network errors, timeouts and non-success statuses.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let url = Url::parse(url)?;
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    info!(bytes = html.len(), "Fetched article page");
    Ok(html)
}

/// Fetch and parse a single article.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article(client: &reqwest::Client, url: &str) -> Result<Article> {
    let html = fetch_page(client, url).await?;
    let article = parse_article(&html);
    info!(
        title = %article.title,
        date = ?article.date,
        paragraphs = article.paragraphs.len(),
        "Parsed article"
    );
    Ok(article)
}

/// Extract title, publication date and body paragraphs from an article page.
pub fn parse_article(html: &str) -> Article {
    let document = Html::parse_document(html);

    let title = document
        .select(&H1)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let date = publication_date(&document);

    let container = document
        .select(&DIV_WITH_CLASS)
        .find(|div| div.value().attr("class").is_some_and(|c| BODY_CLASS.is_match(c)))
        .or_else(|| document.select(&ARTICLE).next());

    let paragraphs = match container {
        Some(container) => container
            .select(&PARAGRAPH)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect(),
        None => {
            debug!("No article body container found");
            Vec::new()
        }
    };

    Article {
        title,
        date,
        paragraphs,
    }
}

/// Text of an element with every whitespace run collapsed to a single space.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Date from the first `<time>` element, or a "6 May 2025" style date in the page text.
fn publication_date(document: &Html) -> Option<String> {
    if let Some(time) = document.select(&TIME).next() {
        if let Some(datetime) = time.value().attr("datetime") {
            let date: String = datetime.trim().chars().take(10).collect();
            return Some(date).filter(|d| !d.is_empty());
        }
    }

    let page_text = document.root_element().text().join(" ");
    DAY_MONTH_YEAR
        .find(&page_text)
        .map(|m| normalize_date(m.as_str()))
}

/// `"6 May 2025"` becomes `"2025-05-06"`; anything chrono cannot read is kept verbatim.
fn normalize_date(raw: &str) -> String {
    let collapsed = raw.split_whitespace().join(" ");
    ["%d %B %Y", "%d %b %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&collapsed, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <header><p>Site navigation</p></header>
          <h1>  Iran: <em>Halt</em> executions  </h1>
          <time datetime="2025-05-06T10:00:00+00:00">6 May 2025</time>
          <div class="container rich-text wysiwyg">
            <p>First   paragraph <a href="x">with a link</a>.</p>
            <p>   </p>
            <p>Second paragraph.</p>
          </div>
          <footer><p>Footer text</p></footer>
        </body></html>
    "#;

    #[test]
    fn test_parse_full_article() {
        let article = parse_article(PAGE);
        assert_eq!(article.title, "Iran: Halt executions");
        assert_eq!(article.date.as_deref(), Some("2025-05-06"));
        assert_eq!(
            article.paragraphs,
            vec!["First paragraph with a link .", "Second paragraph."]
        );
    }

    #[test]
    fn test_date_falls_back_to_page_text() {
        let html = r#"<html><body><h1>T</h1><p>Published 14 March 2024 in London</p>
            <article><p>Body.</p></article></body></html>"#;
        let article = parse_article(html);
        assert_eq!(article.date.as_deref(), Some("2024-03-14"));
        assert_eq!(article.paragraphs, vec!["Body."]);
    }

    #[test]
    fn test_unparseable_date_kept_verbatim() {
        let html = "<html><body><p>On 12 Brumaire 1799 nothing happened</p></body></html>";
        assert_eq!(parse_article(html).date.as_deref(), Some("12 Brumaire 1799"));
    }

    #[test]
    fn test_time_without_datetime_uses_text_search() {
        let html = r#"<html><body><time>yesterday</time><p>3 June 2023</p></body></html>"#;
        assert_eq!(parse_article(html).date.as_deref(), Some("2023-06-03"));
    }

    #[test]
    fn test_article_body_class_preferred_over_article_tag() {
        let html = r#"<html><body>
            <article><p>Teaser</p></article>
            <div class="article-body"><p>Real body</p></div>
            </body></html>"#;
        assert_eq!(parse_article(html).paragraphs, vec!["Real body"]);
    }

    #[test]
    fn test_missing_everything_degrades_gracefully() {
        let article = parse_article("<html><body><p>Loose text</p></body></html>");
        assert_eq!(article.title, DEFAULT_TITLE);
        assert_eq!(article.date, None);
        assert!(article.paragraphs.is_empty());
    }

    #[test]
    fn test_normalize_date_abbreviated_month() {
        assert_eq!(normalize_date("1 Sep 2022"), "2022-09-01");
        assert_eq!(normalize_date("1  September   2022"), "2022-09-01");
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_bad_url() {
        let client = crate::scrapers::http_client().unwrap();
        assert!(fetch_page(&client, "not a url").await.is_err());
    }
}
