//! Headless browser session for captcha capture.
//!
//! Owns one Chromium process driven over CDP. The capture loop waits for
//! the demo page's embedded frame, reads the challenge markup through a
//! scratch tab, and reloads the outer page between rounds. Waits are
//! bounded poll loops rather than fixed sleeps, so a page that never
//! settles surfaces as a timeout error instead of a silent mis-scrape.

use crate::config::Config;
use crate::error::HarvestError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use scraper::{Html, Selector};
use std::time::Instant;
use tokio::task::JoinHandle;
use url::Url;

/// Class the demo frame puts on its challenge image
const CHALLENGE_IMAGE_SELECTOR: &str = "img.captchapict";

pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    config: Config,
}

impl BrowserSession {
    /// Launch a headless browser and navigate to the demo page.
    pub async fn open(config: &Config) -> Result<Self, HarvestError> {
        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .window_size(1280, 900)
            .build()
            .map_err(HarvestError::Browser)?;

        let (browser, mut cdp_events) = Browser::launch(browser_config)
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = cdp_events.next().await {
                if let Err(e) = event {
                    tracing::error!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page(config.demo_page.as_str())
            .await
            .map_err(|e| {
                HarvestError::Browser(format!(
                    "Failed to open demo page {}: {}",
                    config.demo_page, e
                ))
            })?;

        tracing::info!(page = %config.demo_page, "Browser session opened");

        Ok(Self {
            browser,
            page,
            handler,
            config: config.clone(),
        })
    }

    /// Collect captcha image URLs, one full round-trip per iteration.
    ///
    /// An iteration whose frame renders no challenge image contributes no
    /// URL and is skipped silently. A frame that never appears within the
    /// settle window aborts the whole capture.
    pub async fn capture(&mut self, count: u32) -> Result<Vec<String>, HarvestError> {
        let mut urls = Vec::new();

        for iteration in 1..=count {
            let frame = self.wait_for_frame().await?;
            let frame_src = frame
                .attribute("src")
                .await
                .map_err(|e| {
                    HarvestError::Browser(format!("Failed to read frame src: {}", e))
                })?
                .ok_or_else(|| {
                    HarvestError::Browser("Embedded frame has no src attribute".to_string())
                })?;
            let frame_url = resolve_image_url(&self.config.demo_page, &frame_src)?;

            match self.challenge_image_url(&frame_url).await? {
                Some(url) => {
                    tracing::info!(iteration, %url, "Found captcha image");
                    urls.push(url);
                }
                None => {
                    tracing::debug!(iteration, "No challenge image in frame, skipping");
                }
            }

            self.page.reload().await.map_err(|e| {
                HarvestError::Browser(format!("Failed to reload demo page: {}", e))
            })?;
        }

        Ok(urls)
    }

    /// Tear down the browser process. Must run even when `capture` fails;
    /// the caller closes the session before propagating its error.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Browser close failed: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    /// Poll the outer page until its embedded frame exists.
    async fn wait_for_frame(&self) -> Result<Element, HarvestError> {
        let deadline = Instant::now() + self.config.settle_timeout;
        loop {
            if let Ok(element) = self.page.find_element("iframe").await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(HarvestError::SettleTimeout {
                    what: "embedded captcha frame",
                    waited_ms: self.config.settle_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Open the frame document in a scratch tab and poll its markup for
    /// the challenge image. `None` means the frame settled without one.
    async fn challenge_image_url(
        &self,
        frame_url: &str,
    ) -> Result<Option<String>, HarvestError> {
        let frame_page = self.browser.new_page(frame_url).await.map_err(|e| {
            HarvestError::Browser(format!("Failed to open frame {}: {}", frame_url, e))
        })?;

        let deadline = Instant::now() + self.config.settle_timeout;
        let mut found = None;
        loop {
            let html = frame_page.content().await.map_err(|e| {
                HarvestError::Browser(format!("Failed to read frame content: {}", e))
            })?;
            if let Some(src) = extract_challenge_src(&html) {
                found = Some(src);
                break;
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        if let Err(e) = frame_page.close().await {
            tracing::debug!("Scratch tab close failed: {}", e);
        }

        match found {
            Some(src) => Ok(Some(resolve_image_url(&self.config.image_origin, &src)?)),
            None => Ok(None),
        }
    }
}

/// Pull the challenge image's `src` out of the frame markup, if any.
pub fn extract_challenge_src(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CHALLENGE_IMAGE_SELECTOR).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// Resolve a possibly-relative image path against an origin.
pub fn resolve_image_url(origin: &str, src: &str) -> Result<String, HarvestError> {
    let base = Url::parse(origin)
        .map_err(|e| HarvestError::ParseError(format!("Invalid origin {}: {}", origin, e)))?;
    let resolved = base.join(src).map_err(|e| {
        HarvestError::ParseError(format!("Cannot resolve {} against {}: {}", src, origin, e))
    })?;
    Ok(resolved.to_string())
}
