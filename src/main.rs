use captcha_harvest::browser::BrowserSession;
use captcha_harvest::cli::{self, Args, CaptchaArgs, Command};
use captcha_harvest::config::Config;
use captcha_harvest::fetch::ImageFetcher;
use captcha_harvest::pipeline::{self, ItemOutcome};
use captcha_harvest::recognize::TesseractRecognizer;
use captcha_harvest::scrapers;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting captcha-harvest v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Some(Command::Articles(task)) => scrapers::articles::run(&task.output).await?,
        Some(Command::Prices(task)) => scrapers::prices::run(&task.output).await?,
        Some(Command::Weather(task)) => scrapers::weather::run(&task.output).await?,
        Some(Command::Captcha(task)) => run_captcha(&task).await?,
        // Bare invocation runs the captcha pipeline with its defaults
        None => run_captcha(&CaptchaArgs::parse_from(["captcha-harvest"])).await?,
    }

    Ok(())
}

async fn run_captcha(task: &CaptchaArgs) -> anyhow::Result<()> {
    let count = match task.count {
        Some(n) => n,
        None => cli::prompt_count()?,
    };
    let config = Config::from(task);

    // Idempotent; raw and processed images land here
    std::fs::create_dir_all(&config.output_dir)?;

    tracing::info!(count, "Collecting captchas");
    let mut session = BrowserSession::open(&config).await?;
    let captured = session.capture(count).await;
    // Teardown runs even when capture failed
    session.close().await;
    let urls = captured?;
    tracing::info!(count = urls.len(), "Collected captcha URLs");

    let fetcher = ImageFetcher::new(&config)?;
    let recognizer = TesseractRecognizer::new(&config)?;
    let outcomes = pipeline::run(&config, &fetcher, &recognizer, &urls).await?;

    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(o, ItemOutcome::Succeeded(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, ItemOutcome::Skipped { .. }))
        .count();
    let failed = outcomes.len() - succeeded - skipped;

    tracing::info!(
        succeeded,
        skipped,
        failed,
        report = %config.report_path.display(),
        images = %config.output_dir.display(),
        "Run complete"
    );

    Ok(())
}
