//! Article listing scraper.
//!
//! Indexes the listing page's popular grid, then fetches each article
//! for its headline, last-updated stamp, and description. Failed article
//! fetches are logged and skipped without failing the batch.

use super::text_of;
use crate::error::HarvestError;
use scraper::{Html, Selector};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use url::Url;

const LISTING_PAGE: &str =
    "https://www.geeksforgeeks.org/introduction-to-artificial-intelligence/";
const SITE_ORIGIN: &str = "https://www.geeksforgeeks.org";

#[derive(Debug, Clone)]
pub struct ArticleLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ArticleDetails {
    pub headline: String,
    pub last_updated: String,
    pub description: String,
}

pub async fn run(output: &Path) -> Result<(), HarvestError> {
    let client = super::http_client(Duration::from_secs(10))?;
    let base = Url::parse(SITE_ORIGIN)
        .map_err(|e| HarvestError::ParseError(format!("Invalid site origin: {}", e)))?;

    let html = fetch_page(&client, LISTING_PAGE).await?;
    let links = parse_article_links(&html, &base);
    tracing::info!(count = links.len(), "Indexed article links");

    let mut scraped = Vec::new();
    for link in links {
        tracing::info!(title = %link.title, "Scraping article");
        match fetch_page(&client, &link.url).await {
            Ok(article_html) => {
                let details = parse_article_details(&article_html);
                scraped.push((link, details));
            }
            Err(e) => {
                tracing::warn!(url = %link.url, "Article fetch failed, skipping: {}", e);
            }
        }
    }

    write_report(output, &scraped)?;
    tracing::info!(count = scraped.len(), path = %output.display(), "Article report written");
    Ok(())
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, HarvestError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HarvestError::RequestError(format!("GET {} failed: {}", url, e)))?;
    response
        .text()
        .await
        .map_err(|e| HarvestError::RequestError(format!("Reading {} failed: {}", url, e)))
}

/// Extract (title, absolute URL) pairs from the listing page's grid.
pub fn parse_article_links(html: &str, base: &Url) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".popular-grid-container .popular-grid-item a").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let title = text_of(&element);
        if let Some(href) = element.value().attr("href") {
            if let Ok(resolved) = base.join(href) {
                links.push(ArticleLink {
                    title,
                    url: resolved.to_string(),
                });
            }
        }
    }
    links
}

/// Pull headline, last-updated stamp, and description from an article page.
pub fn parse_article_details(html: &str) -> ArticleDetails {
    let document = Html::parse_document(html);

    let headline = document
        .select(&Selector::parse("h1").unwrap())
        .next()
        .map(|h| text_of(&h))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No headline found".to_string());

    let last_updated = document
        .select(&Selector::parse("div.last_updated_parent").unwrap())
        .next()
        .and_then(|parent| {
            // Second span under the parent holds the date
            parent
                .select(&Selector::parse("span").unwrap())
                .nth(1)
                .map(|span| text_of(&span))
        })
        .unwrap_or_else(|| "Not found".to_string());

    let description = document
        .select(&Selector::parse(r#"p[dir="ltr"]"#).unwrap())
        .map(|p| text_of(&p))
        .collect::<Vec<_>>()
        .join(" ");

    ArticleDetails {
        headline,
        last_updated,
        description,
    }
}

fn write_report(
    path: &Path,
    articles: &[(ArticleLink, ArticleDetails)],
) -> Result<(), HarvestError> {
    let mut file = File::create(path)?;
    for (link, details) in articles {
        writeln!(file, "Link text: {}", link.title)?;
        writeln!(file, "URL: {}", link.url)?;
        writeln!(file, "Article headline: {}", details.headline)?;
        writeln!(file, "Last updated: {}", details.last_updated)?;
        writeln!(file, "Description: {}", details.description)?;
        writeln!(file, "{}", "=".repeat(70))?;
        writeln!(file)?;
    }
    Ok(())
}
