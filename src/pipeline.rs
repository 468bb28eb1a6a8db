//! Per-captcha orchestration: fetch, normalize, recognize, clean, report.

use crate::cleaner;
use crate::config::Config;
use crate::error::HarvestError;
use crate::fetch::ImageSource;
use crate::preprocess;
use crate::recognize::Recognizer;
use crate::report::ReportWriter;
use std::path::PathBuf;

/// One challenge image and its derived artifacts. Fields are filled in
/// stage by stage and never mutated after the run.
#[derive(Debug, Clone)]
pub struct CaptchaInstance {
    pub index: usize,
    pub source_url: String,
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub raw_text: String,
    pub cleaned_text: String,
}

/// Typed per-item result. A download miss is a skip; a processing error
/// marks the item failed without aborting the rest of the loop.
#[derive(Debug)]
pub enum ItemOutcome {
    Succeeded(CaptchaInstance),
    Skipped { url: String, reason: String },
    Failed { url: String, reason: String },
}

/// Run the pipeline over the collected URLs, strictly in order.
///
/// The report file is created up front and flushed after every success,
/// so a crash later in the loop cannot discard completed entries.
pub async fn run(
    config: &Config,
    source: &dyn ImageSource,
    recognizer: &dyn Recognizer,
    urls: &[String],
) -> Result<Vec<ItemOutcome>, HarvestError> {
    let mut report = ReportWriter::create(&config.report_path)?;
    let mut outcomes = Vec::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        let index = i + 1;

        let raw_path = match source.fetch(url, index).await? {
            Some(path) => path,
            None => {
                tracing::warn!(%url, "Failed to download, skipping");
                outcomes.push(ItemOutcome::Skipped {
                    url: url.clone(),
                    reason: "download failed".to_string(),
                });
                continue;
            }
        };

        match process_item(config, recognizer, index, url, raw_path) {
            Ok(instance) => {
                tracing::info!(
                    index,
                    raw = %instance.raw_text,
                    cleaned = %instance.cleaned_text,
                    "Recognized captcha"
                );
                report.append(&instance)?;
                outcomes.push(ItemOutcome::Succeeded(instance));
            }
            Err(e) => {
                tracing::error!(%url, "Processing failed: {}", e);
                outcomes.push(ItemOutcome::Failed {
                    url: url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcomes)
}

fn process_item(
    config: &Config,
    recognizer: &dyn Recognizer,
    index: usize,
    url: &str,
    raw_path: PathBuf,
) -> Result<CaptchaInstance, HarvestError> {
    let processed_path = preprocess::normalize(&raw_path, config.threshold)?;
    let raw_text = recognizer.recognize(&processed_path)?;
    let cleaned_text = cleaner::clean(&raw_text);

    Ok(CaptchaInstance {
        index,
        source_url: url.to_string(),
        raw_path,
        processed_path,
        raw_text,
        cleaned_text,
    })
}
