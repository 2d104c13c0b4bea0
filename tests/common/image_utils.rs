//! Image inspection utilities for testing.
//!
//! This module provides helper functions for decoding and verifying rendered figures.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};

/// Background color of every rendered figure
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Load an image from a byte array
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check if an image has the expected dimensions
///
/// # Returns
///
/// * `Ok(())` if the image has the expected dimensions
/// * `Err(String)` with an error message if the dimensions differ
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

/// Check if an image has the expected format
pub fn assert_image_format(bytes: &[u8], expected_format: ImageFormat) -> Result<(), String> {
    let actual_format =
        detect_image_format(bytes).ok_or_else(|| "Could not detect image format".to_string())?;

    if actual_format != expected_format {
        return Err(format!(
            "Image format differs: actual = {:?}, expected = {:?}",
            actual_format, expected_format
        ));
    }

    Ok(())
}

/// Number of pixels that differ from the background by more than `tolerance`
/// in any channel
pub fn count_drawn_pixels(image: &DynamicImage, tolerance: u8) -> usize {
    image
        .to_rgb8()
        .pixels()
        .filter(|p| {
            p.0.iter()
                .zip(BACKGROUND.iter())
                .any(|(a, b)| a.abs_diff(*b) > tolerance)
        })
        .count()
}

/// Pixels whose color is within `tolerance` of `color` in every channel
pub fn count_pixels_near(image: &DynamicImage, color: [u8; 3], tolerance: u8) -> usize {
    image
        .to_rgb8()
        .pixels()
        .filter(|p| p.0.iter().zip(color.iter()).all(|(a, b)| a.abs_diff(*b) <= tolerance))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_detect_image_format() {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(2, 2);
        let mut png_bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();

        assert_eq!(detect_image_format(&png_bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn test_count_drawn_pixels() {
        let mut img = ImageBuffer::from_pixel(4, 4, Rgb(BACKGROUND));
        img.put_pixel(1, 1, Rgb([0, 0, 0]));
        img.put_pixel(2, 2, Rgb([254, 255, 255]));
        let img = DynamicImage::ImageRgb8(img);

        assert_eq!(count_drawn_pixels(&img, 2), 1);
        assert_eq!(count_drawn_pixels(&img, 0), 2);
        assert_eq!(count_pixels_near(&img, [0, 0, 0], 0), 1);
    }
}
