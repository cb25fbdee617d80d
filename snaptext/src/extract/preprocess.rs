use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader, RgbImage};

use crate::error::{Result, SnaptextError};

/// Decode uploaded bytes into an image, guessing the format from content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SnaptextError::Decode(format!("Failed to read image: {e}")))?;

    reader
        .decode()
        .map_err(|e| SnaptextError::Decode(format!("Failed to decode image: {e}")))
}

/// Normalize an image for extraction: convert to three-channel RGB and,
/// when either dimension exceeds `max_dim`, downscale with Lanczos3 so the
/// largest dimension lands exactly on `max_dim` (within rounding) while
/// preserving aspect ratio. Keeps payloads under the providers'
/// request-size limits.
pub fn normalize_for_extraction(image: &DynamicImage, max_dim: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let largest = width.max(height);
    if largest <= max_dim {
        return rgb;
    }

    let ratio = max_dim as f64 / largest as f64;
    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);
    image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3)
}

/// Encode a normalized image as PNG bytes for backend consumption.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| SnaptextError::Internal(format!("Failed to encode image: {e}")))?;
    Ok(output)
}
