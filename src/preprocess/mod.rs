//! Captcha image normalization.
//!
//! Deterministic transform preparing a raw capture for OCR: greyscale,
//! auto-contrast stretch, fixed-cutoff binarization, median denoise.
//! The normalized image is written next to the raw one with a `_proc.png`
//! suffix.

pub mod steps;

use crate::error::HarvestError;
use std::path::{Path, PathBuf};

/// Normalize one raw captcha and persist the result.
///
/// Decode and encode failures propagate; the pipeline records the item
/// as failed and moves on.
pub fn normalize(path: &Path, threshold: u8) -> Result<PathBuf, HarvestError> {
    let img = image::open(path).map_err(|e| {
        HarvestError::ProcessingError(format!("Failed to load image {}: {}", path.display(), e))
    })?;

    let img = steps::grayscale::apply(img)?;
    let img = steps::contrast::apply(img)?;
    let img = steps::threshold::apply(img, threshold)?;
    let img = steps::denoise::apply(img)?;

    let out_path = derived_path(path);
    img.save(&out_path).map_err(|e| {
        HarvestError::ProcessingError(format!(
            "Failed to save normalized image {}: {}",
            out_path.display(),
            e
        ))
    })?;

    Ok(out_path)
}

/// Derive the normalized image's path from the raw one.
fn derived_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "captcha".to_string());
    input.with_file_name(format!("{}_proc.png", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_derived_path_replaces_extension() {
        let out = derived_path(Path::new("captchas/captcha_3.jpeg"));
        assert_eq!(out, Path::new("captchas/captcha_3_proc.png"));
    }

    #[test]
    fn test_normalize_writes_binary_png() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("captcha_1.jpeg");

        // Horizontal gradient so both sides of the cutoff are present
        let img = GrayImage::from_fn(64, 16, |x, _| Luma([(x as u8) * 4]));
        img.save(&raw).unwrap();

        let out = normalize(&raw, 150).unwrap();
        assert_eq!(out.file_name().unwrap(), "captcha_1_proc.png");

        let processed = image::open(&out).unwrap().to_luma8();
        for pixel in processed.pixels() {
            assert!(pixel.0[0] == 0 || pixel.0[0] == 255);
        }
    }

    #[test]
    fn test_normalize_rejects_undecodable_input() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("captcha_1.jpeg");
        std::fs::write(&raw, b"not an image").unwrap();

        assert!(normalize(&raw, 150).is_err());
    }
}
