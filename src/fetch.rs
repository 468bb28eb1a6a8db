//! Captcha image download.
//!
//! Non-200 responses, request errors, and interrupted bodies are all
//! per-item skip conditions, not failures: the pipeline drops the item
//! and keeps going.

use crate::config::Config;
use crate::error::HarvestError;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// User-agent presented to the image origin
const SPOOFED_USER_AGENT: &str = "Mozilla/5.0";

/// Source of raw captcha bytes, one file per instance.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Download one image. `Ok(None)` means the item should be skipped.
    async fn fetch(&self, url: &str, index: usize) -> Result<Option<PathBuf>, HarvestError>;
}

pub struct ImageFetcher {
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl ImageFetcher {
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .user_agent(SPOOFED_USER_AGENT)
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| {
                HarvestError::RequestError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            output_dir: config.output_dir.clone(),
        })
    }
}

#[async_trait]
impl ImageSource for ImageFetcher {
    async fn fetch(&self, url: &str, index: usize) -> Result<Option<PathBuf>, HarvestError> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%url, "Download failed: {}", e);
                return Ok(None);
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(%url, status = %response.status(), "Skipping non-200 download");
            return Ok(None);
        }

        let path = self.output_dir.join(format!("captcha_{}.jpeg", index));
        let mut file = File::create(&path).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(%url, "Download interrupted: {}", e);
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Ok(None);
                }
            };
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(%url, path = %path.display(), "Downloaded captcha image");
        Ok(Some(path))
    }
}
