use crate::error::HarvestError;
use image::{DynamicImage, GrayImage, Luma};

/// Binarize against a fixed cutoff: pixels strictly above it become
/// white, everything else (the cutoff itself included) becomes black.
pub fn apply(image: DynamicImage, cutoff: u8) -> Result<DynamicImage, HarvestError> {
    let gray = image.to_luma8();
    let binarized = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0];
        if pixel > cutoff {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    Ok(DynamicImage::ImageLuma8(binarized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarizes_image() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x as u8 * 5).min(255)]));

        let result = apply(DynamicImage::ImageLuma8(img), 150).unwrap();
        let result_gray = result.to_luma8();

        for pixel in result_gray.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_threshold_boundary_is_black() {
        let cutoff = 150u8;
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([cutoff - 1]));
        img.put_pixel(1, 0, Luma([cutoff]));
        img.put_pixel(2, 0, Luma([cutoff + 1]));

        let result = apply(DynamicImage::ImageLuma8(img), cutoff).unwrap();
        let result_gray = result.to_luma8();

        assert_eq!(result_gray.get_pixel(0, 0).0[0], 0);
        // The cutoff value itself stays black; only strictly-above is white
        assert_eq!(result_gray.get_pixel(1, 0).0[0], 0);
        assert_eq!(result_gray.get_pixel(2, 0).0[0], 255);
    }
}
