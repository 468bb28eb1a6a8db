use crate::error::HarvestError;
use image::DynamicImage;
use imageproc::filter::median_filter;

/// 3x3 median filter. Knocks out the salt-and-pepper speckle the
/// binarization step tends to leave around glyph edges.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, HarvestError> {
    let gray = image.to_luma8();
    let denoised = median_filter(&gray, 1, 1);
    Ok(DynamicImage::ImageLuma8(denoised))
}
