//! Image decoding and JPEG encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::error::{PosterError, Result};

/// Image formats accepted for backgrounds and sub-images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    /// Parse a type tag (`jpg`, `jpeg`, `png`, case-insensitive, no dot).
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageType::Jpeg),
            "png" => Ok(ImageType::Png),
            _ => Err(PosterError::UnsupportedImageType(tag.to_string())),
        }
    }

    pub fn format(self) -> ImageFormat {
        match self {
            ImageType::Jpeg => ImageFormat::Jpeg,
            ImageType::Png => ImageFormat::Png,
        }
    }
}

/// Decode `bytes` as the given type.
pub fn decode(bytes: &[u8], kind: ImageType) -> Result<RgbaImage> {
    image::load_from_memory_with_format(bytes, kind.format())
        .map(|img| img.to_rgba8())
        .map_err(|e| PosterError::Decode(format!("{:?} image: {}", kind, e)))
}

/// Decode `bytes`, sniffing the format from its magic number.
pub fn decode_any(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| PosterError::Decode(e.to_string()))
}

/// Encode the canvas as a baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let p = canvas.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    });

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| PosterError::Encode(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}
