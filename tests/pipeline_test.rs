//! End-to-end pipeline test with a stub image source and recognizer.

use async_trait::async_trait;
use captcha_harvest::config::Config;
use captcha_harvest::error::HarvestError;
use captcha_harvest::fetch::ImageSource;
use captcha_harvest::pipeline::{self, ItemOutcome};
use captcha_harvest::recognize::Recognizer;
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Writes a small decodable image per fetch, except for one index that
/// simulates a failed download.
struct StubSource {
    dir: PathBuf,
    missing_index: usize,
}

#[async_trait]
impl ImageSource for StubSource {
    async fn fetch(&self, _url: &str, index: usize) -> Result<Option<PathBuf>, HarvestError> {
        if index == self.missing_index {
            return Ok(None);
        }
        let path = self.dir.join(format!("captcha_{}.jpeg", index));
        let img = GrayImage::from_fn(40, 12, |x, _| Luma([(x as u8) * 6]));
        img.save(&path)
            .map_err(|e| HarvestError::ProcessingError(e.to_string()))?;
        Ok(Some(path))
    }
}

/// Always reports the same noisy text.
struct StubRecognizer;

impl Recognizer for StubRecognizer {
    fn recognize(&self, _path: &Path) -> Result<String, HarvestError> {
        Ok("ab12!!".to_string())
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        demo_page: "https://example.com/demo".to_string(),
        image_origin: "https://example.com".to_string(),
        output_dir: dir.to_path_buf(),
        report_path: dir.join("capture_codes.txt"),
        threshold: 150,
        fetch_timeout: Duration::from_secs(5),
        settle_timeout: Duration::from_secs(1),
        poll_interval: Duration::from_millis(50),
        ocr_language: "eng".to_string(),
    }
}

#[tokio::test]
async fn test_pipeline_reports_only_downloaded_items_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let urls: Vec<String> = [
        "https://example.com/image/a.jpeg",
        "https://example.com/image/b.jpeg",
        "https://example.com/image/c.jpeg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let source = StubSource {
        dir: dir.path().to_path_buf(),
        missing_index: 2,
    };

    let outcomes = pipeline::run(&config, &source, &StubRecognizer, &urls)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0], ItemOutcome::Succeeded(_)));
    assert!(matches!(outcomes[1], ItemOutcome::Skipped { .. }));
    assert!(matches!(outcomes[2], ItemOutcome::Succeeded(_)));

    let report = std::fs::read_to_string(&config.report_path).unwrap();
    let image_lines: Vec<&str> = report
        .lines()
        .filter(|l| l.starts_with("Image: "))
        .collect();
    assert_eq!(image_lines.len(), 2);
    assert!(image_lines[0].contains("captcha_1.jpeg"));
    assert!(image_lines[1].contains("captcha_3.jpeg"));

    // Every entry keeps its source URL and the stub recognizer's text
    assert!(report.contains("URL: https://example.com/image/a.jpeg"));
    assert!(report.contains("URL: https://example.com/image/c.jpeg"));
    assert!(!report.contains("URL: https://example.com/image/b.jpeg"));
    assert!(report.contains("OCR Raw: ab12!!"));
    assert!(report.contains("Cleaned: ab12"));
}

/// A download that produces undecodable bytes marks the item failed
/// without aborting the rest of the loop.
struct GarbageSource {
    dir: PathBuf,
}

#[async_trait]
impl ImageSource for GarbageSource {
    async fn fetch(&self, _url: &str, index: usize) -> Result<Option<PathBuf>, HarvestError> {
        let path = self.dir.join(format!("captcha_{}.jpeg", index));
        if index == 1 {
            std::fs::write(&path, b"not an image")?;
        } else {
            let img = GrayImage::from_fn(40, 12, |x, _| Luma([(x as u8) * 6]));
            img.save(&path)
                .map_err(|e| HarvestError::ProcessingError(e.to_string()))?;
        }
        Ok(Some(path))
    }
}

#[tokio::test]
async fn test_pipeline_survives_undecodable_item() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let urls: Vec<String> = [
        "https://example.com/image/bad.jpeg",
        "https://example.com/image/good.jpeg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let source = GarbageSource {
        dir: dir.path().to_path_buf(),
    };

    let outcomes = pipeline::run(&config, &source, &StubRecognizer, &urls)
        .await
        .unwrap();

    assert!(matches!(outcomes[0], ItemOutcome::Failed { .. }));
    assert!(matches!(outcomes[1], ItemOutcome::Succeeded(_)));

    // The failed item left no report entry; the later success did
    let report = std::fs::read_to_string(&config.report_path).unwrap();
    assert!(!report.contains("bad.jpeg"));
    assert!(report.contains("good.jpeg"));
}
