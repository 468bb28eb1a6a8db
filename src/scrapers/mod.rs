//! Companion fetch-parse-write scrapers.
//!
//! Each submodule is an independent task with its own fixed selectors
//! and output format; there is deliberately no shared scraping
//! abstraction beyond the HTTP client constructor.

pub mod articles;
pub mod prices;
pub mod weather;

use crate::error::HarvestError;
use std::time::Duration;

const SPOOFED_USER_AGENT: &str = "Mozilla/5.0";

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, HarvestError> {
    reqwest::Client::builder()
        .user_agent(SPOOFED_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| HarvestError::RequestError(format!("Failed to build HTTP client: {}", e)))
}

/// Collapse an element's text nodes into one whitespace-normalized string.
pub(crate) fn text_of(element: &scraper::ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
