//! Text recognition.
//!
//! Tesseract in single-word segmentation mode with an alphanumeric
//! whitelist. Uses the tesseract-static crate for static linking (no
//! system dependencies); training data is downloaded on first use.

use crate::config::Config;
use crate::error::HarvestError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tesseract_static::tesseract::Tesseract;

/// Characters the engine is allowed to report
const CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Page segmentation mode 8: treat the image as a single word
const SINGLE_WORD_MODE: &str = "8";

/// Extracts text from a normalized captcha image.
///
/// "Nothing readable" is an empty or noisy string, never an error.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<String, HarvestError>;
}

pub struct TesseractRecognizer {
    /// Path to the tessdata directory
    tessdata_path: String,
    /// Language the engine was initialized with
    language: String,
}

impl TesseractRecognizer {
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let language = config.ocr_language.clone();

        // Ensure training data is available (download if needed)
        let tessdata_path = ensure_tessdata_available(&language)?;

        // Validate the datapath/language pair with a throwaway instance
        let probe = Tesseract::new(Some(&tessdata_path), Some(&language)).map_err(|e| {
            HarvestError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(probe);

        tracing::info!(
            "Tesseract recognizer initialized (tessdata: {}, language: {})",
            tessdata_path,
            language
        );

        Ok(Self {
            tessdata_path,
            language,
        })
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, path: &Path) -> Result<String, HarvestError> {
        let img = image::open(path).map_err(|e| {
            HarvestError::ProcessingError(format!(
                "Failed to load image {}: {}",
                path.display(),
                e
            ))
        })?;

        // Hand the engine BMP bytes; BMP is always supported by leptonica
        let rgb_img = img.to_rgb8();
        let mut bmp_data = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut bmp_data);
            rgb_img
                .write_to(&mut cursor, image::ImageFormat::Bmp)
                .map_err(|e| {
                    HarvestError::ProcessingError(format!("Failed to convert to BMP: {}", e))
                })?;
        }

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.language))
            .map_err(|e| HarvestError::OcrError(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess
            .set_variable("tessedit_char_whitelist", CHAR_WHITELIST)
            .map_err(|e| HarvestError::OcrError(format!("Failed to set whitelist: {}", e)))?;

        tess = tess
            .set_variable("tessedit_pageseg_mode", SINGLE_WORD_MODE)
            .map_err(|e| {
                HarvestError::OcrError(format!("Failed to set segmentation mode: {}", e))
            })?;

        tess = tess
            .set_image_from_mem(&bmp_data)
            .map_err(|e| HarvestError::OcrError(format!("Failed to set image: {}", e)))?;

        tess = tess
            .recognize()
            .map_err(|e| HarvestError::OcrError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| HarvestError::OcrError(format!("Failed to get text: {}", e)))?;

        Ok(text.trim().to_string())
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure training data is available, downloading if needed.
fn ensure_tessdata_available(language: &str) -> Result<String, HarvestError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("captcha-harvest")
        .join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        HarvestError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    let traineddata_file = format!("{}.traineddata", language);
    let traineddata_path = cache_dir.join(&traineddata_file);

    if !traineddata_path.exists() {
        let url = tessdata_url(language);
        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            language
        );
        download_file(&url, &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    } else {
        tracing::debug!("Using cached tessdata from {:?}", cache_dir);
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| HarvestError::InitializationError("Invalid tessdata path".to_string()))
}

/// Training-data download URL for a language.
fn tessdata_url(language: &str) -> String {
    // tessdata_fast keeps the download small
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

/// Download a file from URL to path using ureq.
fn download_file(url: &str, path: &Path) -> Result<(), HarvestError> {
    let response = ureq::get(url).call().map_err(|e| {
        HarvestError::InitializationError(format!("Failed to download tessdata: {}", e))
    })?;

    let mut file = File::create(path).map_err(|e| {
        HarvestError::InitializationError(format!("Failed to create tessdata file: {}", e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        HarvestError::InitializationError(format!("Failed to read tessdata response: {}", e))
    })?;

    file.write_all(&buffer).map_err(|e| {
        HarvestError::InitializationError(format!("Failed to write tessdata file: {}", e))
    })?;

    Ok(())
}
