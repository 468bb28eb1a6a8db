//! OCR output cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

static ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[A-Za-z0-9]+").expect("static pattern"));

/// First maximal alphanumeric run of the trimmed input, else empty.
///
/// Total function: garbage in, empty string out, never an error.
pub fn clean(raw: &str) -> String {
    ALNUM_RUN
        .find(raw.trim())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
