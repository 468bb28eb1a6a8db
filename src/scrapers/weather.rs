//! Per-city weather scraper with a primary site and a fallback.
//!
//! The primary site's failure (404 or missing weather nodes) triggers
//! one fallback attempt against the second site. The precise failure
//! reason is warn-logged before falling back, so a selector regression
//! is distinguishable in logs from real unavailability.

use super::text_of;
use crate::error::HarvestError;
use scraper::{Html, Selector};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Cities tracked by the report
pub const CITIES: [&str; 12] = [
    "stockholm",
    "gothenburg",
    "malmo",
    "uppsala",
    "orebro",
    "vasteras",
    "linkoping",
    "helsingborg",
    "jonkoping",
    "norrkoping",
    "falun",
    "borlange",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditions {
    pub temperature: String,
    pub condition: String,
}

#[derive(Debug, Clone)]
pub struct CityReport {
    pub city: String,
    pub site: &'static str,
    pub result: Result<Conditions, String>,
}

pub async fn run(output: &Path) -> Result<(), HarvestError> {
    let client = super::http_client(Duration::from_secs(10))?;

    let mut reports = Vec::with_capacity(CITIES.len());
    for city in CITIES {
        tracing::info!(city, "Scraping weather");
        reports.push(report_city(&client, city).await);
    }

    write_report(output, &reports)?;
    tracing::info!(path = %output.display(), "Weather report written");
    Ok(())
}

/// Try the primary site first; fall back to the second on any failure.
pub async fn report_city(client: &reqwest::Client, city: &str) -> CityReport {
    match scrape_timeanddate(client, city).await {
        Ok(conditions) => CityReport {
            city: city.to_string(),
            site: "TimeAndDate",
            result: Ok(conditions),
        },
        Err(reason) => {
            tracing::warn!(city, %reason, "Primary site failed, trying fallback");
            CityReport {
                city: city.to_string(),
                site: "Wunderground",
                result: scrape_wunderground(client, city).await,
            }
        }
    }
}

async fn scrape_timeanddate(
    client: &reqwest::Client,
    city: &str,
) -> Result<Conditions, String> {
    let url = format!("https://www.timeanddate.com/weather/sweden/{}", city);
    let html = fetch_weather_page(client, &url).await?;
    parse_timeanddate(&html)
}

async fn scrape_wunderground(
    client: &reqwest::Client,
    city: &str,
) -> Result<Conditions, String> {
    let url = format!("https://www.wunderground.com/weather/se/{}", city);
    let html = fetch_weather_page(client, &url).await?;
    parse_wunderground(&html)
}

async fn fetch_weather_page(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err("404 Not Found".to_string());
    }
    response.text().await.map_err(|e| e.to_string())
}

pub fn parse_timeanddate(html: &str) -> Result<Conditions, String> {
    let document = Html::parse_document(html);

    let temperature = document
        .select(&Selector::parse("div.h2").unwrap())
        .next()
        .map(|t| text_of(&t));
    let condition = document
        .select(&Selector::parse("#qlook").unwrap())
        .next()
        .and_then(|q| {
            q.select(&Selector::parse("p").unwrap())
                .next()
                .map(|p| text_of(&p))
        });

    match (temperature, condition) {
        (Some(temperature), Some(condition)) => Ok(Conditions {
            temperature,
            condition,
        }),
        _ => Err("No weather data found".to_string()),
    }
}

pub fn parse_wunderground(html: &str) -> Result<Conditions, String> {
    let document = Html::parse_document(html);

    let temperature = document
        .select(&Selector::parse("span.wu-value.wu-value-to").unwrap())
        .next()
        .map(|t| text_of(&t));
    let condition = document
        .select(&Selector::parse("div.condition-icon").unwrap())
        .next()
        .map(|c| text_of(&c));

    match (temperature, condition) {
        (Some(temperature), Some(condition)) => Ok(Conditions {
            temperature,
            condition,
        }),
        _ => Err("No weather data found".to_string()),
    }
}

fn write_report(path: &Path, reports: &[CityReport]) -> Result<(), HarvestError> {
    let mut file = File::create(path)?;

    writeln!(
        file,
        "Weather Report - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file, "{}", "=".repeat(70))?;
    writeln!(file)?;

    for report in reports {
        writeln!(file, "City: {}", capitalize(&report.city))?;
        writeln!(file, "Source: {}", report.site)?;
        match &report.result {
            Ok(conditions) => {
                writeln!(file, "Temperature: {}", conditions.temperature)?;
                writeln!(file, "Condition: {}", conditions.condition)?;
            }
            Err(reason) => {
                writeln!(file, "Error: {}", reason)?;
            }
        }
        writeln!(file, "{}", "-".repeat(50))?;
    }

    Ok(())
}

fn capitalize(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
