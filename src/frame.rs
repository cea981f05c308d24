//! Frame decode and grayscale helpers.
//!
//! Picture payloads arrive as encoded JPEG bytes. Decode happens in memory;
//! a payload that cannot be decoded is dropped by the caller, never fatal.

use anyhow::{Context, Result};
use image::{GrayImage, RgbImage};

use crate::geometry::Rect;

/// Decode an encoded picture payload into an RGB pixel buffer.
pub fn decode_frame(payload: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(payload).context("decode picture payload")?;
    Ok(image.into_rgb8())
}

/// Grayscale conversion for the detector.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Copy a region of interest into a contiguous grayscale buffer.
///
/// The rect must already be clamped to the image bounds.
pub fn crop_gray(gray: &GrayImage, rect: Rect) -> Vec<u8> {
    image::imageops::crop_imm(gray, rect.x, rect.y, rect.width, rect.height)
        .to_image()
        .into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn decode_rejects_garbage_payload() {
        assert!(decode_frame(b"\x00\x01\x02not an image").is_err());
    }

    #[test]
    fn decode_roundtrips_jpeg() {
        let img = RgbImage::from_pixel(16, 8, image::Rgb([120, 60, 30]));
        let mut encoded = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut encoded),
            image::ImageFormat::Jpeg,
        )
        .expect("encode jpeg");
        let decoded = decode_frame(&encoded).expect("decode");
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn crop_extracts_contiguous_roi() {
        let mut gray = GrayImage::from_pixel(8, 8, Luma([0]));
        gray.put_pixel(3, 2, Luma([200]));
        let roi = crop_gray(&gray, Rect::new(2, 1, 4, 3));
        assert_eq!(roi.len(), 12);
        // (3,2) in image coordinates lands at (1,1) inside the ROI.
        assert_eq!(roi[4 + 1], 200);
    }
}
