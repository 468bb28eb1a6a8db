use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Count used when the interactive prompt receives non-numeric input
pub const DEFAULT_CAPTCHA_COUNT: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "captcha-harvest")]
#[command(about = "Headless captcha capture and OCR pipeline, with companion page scrapers")]
#[command(version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture captcha images from the demo page and recognize them
    Captcha(CaptchaArgs),
    /// Scrape the article listing and per-article details into a text report
    Articles(ArticlesArgs),
    /// Scrape product names and prices into a CSV file
    Prices(PricesArgs),
    /// Scrape current weather for the tracked cities into a text report
    Weather(WeatherArgs),
}

#[derive(Parser, Debug)]
pub struct CaptchaArgs {
    /// Number of captchas to capture (prompted for when omitted)
    #[arg(long)]
    pub count: Option<u32>,

    /// Directory for raw and processed captcha images
    #[arg(long, default_value = "captchas")]
    pub output_dir: PathBuf,

    /// Results file
    #[arg(long, default_value = "capture_codes.txt")]
    pub report: PathBuf,

    /// Binarization cutoff (pixels above it become white)
    #[arg(long, default_value_t = 150)]
    pub threshold: u8,

    /// Demo page hosting the embedded captcha frame
    #[arg(long, env = "CAPTCHA_DEMO_PAGE", default_value = "https://nopecha.com/demo/textcaptcha")]
    pub demo_page: String,

    /// Origin that relative image paths resolve against
    #[arg(long, env = "CAPTCHA_IMAGE_ORIGIN", default_value = "https://nopecha.com")]
    pub image_origin: String,

    /// Per-download timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub fetch_timeout_secs: u64,

    /// Upper bound in milliseconds on waiting for remote content to settle
    #[arg(long, default_value_t = 10_000)]
    pub settle_timeout_ms: u64,

    /// Language for the OCR engine
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    pub ocr_language: String,
}

#[derive(clap::Args, Debug)]
pub struct ArticlesArgs {
    /// Output text file
    #[arg(long, default_value = "articles.txt")]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PricesArgs {
    /// Output CSV file
    #[arg(long, default_value = "prices.csv")]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct WeatherArgs {
    /// Output text file
    #[arg(long, default_value = "weather.txt")]
    pub output: PathBuf,
}

/// Parse an iteration count typed at the prompt.
///
/// Anything that is not a plain non-negative integer falls back to
/// [`DEFAULT_CAPTCHA_COUNT`] rather than failing the run.
pub fn parse_count(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(
                input = input.trim(),
                "Invalid count, defaulting to {}",
                DEFAULT_CAPTCHA_COUNT
            );
            DEFAULT_CAPTCHA_COUNT
        }
    }
}

/// Ask on stdin how many captchas to capture.
pub fn prompt_count() -> io::Result<u32> {
    print!("Enter number of captchas to capture: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(parse_count(&line))
}
