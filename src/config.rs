use crate::cli::CaptchaArgs;
use std::path::PathBuf;
use std::time::Duration;

/// Captcha pipeline configuration
///
/// Built once from the CLI and passed into each component. No component
/// reads paths or origins from anywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    /// Demo page hosting the embedded captcha frame
    pub demo_page: String,
    /// Origin that relative image paths resolve against
    pub image_origin: String,
    /// Directory for raw and processed captcha images
    pub output_dir: PathBuf,
    /// Line-structured results file
    pub report_path: PathBuf,
    /// Binarization cutoff for the normalizer
    pub threshold: u8,
    /// Per-download timeout for image fetches
    pub fetch_timeout: Duration,
    /// Upper bound on waiting for remote content to settle
    pub settle_timeout: Duration,
    /// Interval between readiness probes while settling
    pub poll_interval: Duration,
    /// Language the OCR engine is initialized with
    pub ocr_language: String,
}

impl From<&CaptchaArgs> for Config {
    fn from(args: &CaptchaArgs) -> Self {
        Self {
            demo_page: args.demo_page.clone(),
            image_origin: args.image_origin.clone(),
            output_dir: args.output_dir.clone(),
            report_path: args.report.clone(),
            threshold: args.threshold,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            settle_timeout: Duration::from_millis(args.settle_timeout_ms),
            poll_interval: Duration::from_millis(250),
            ocr_language: args.ocr_language.clone(),
        }
    }
}
