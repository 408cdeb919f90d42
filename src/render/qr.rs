//! QR code generation at an exact pixel size.

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::{PosterError, Result};

/// Light modules around the symbol, on each side.
pub const QUIET_ZONE: u32 = 4;

/// Render `content` as a high error-correction QR symbol.
///
/// The result is a `size × size` tile of `background` with the symbol
/// (quiet zone included) centered on it at the largest whole-pixel module
/// size that fits. If the symbol cannot fit even at one pixel per module,
/// the tile grows to the symbol's minimum size.
pub fn generate(
    content: &str,
    size: u32,
    foreground: Rgba<u8>,
    background: Rgba<u8>,
) -> Result<RgbaImage> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::H)
        .map_err(|e| PosterError::QrCode(format!("QR code generation failed: {}", e)))?;

    let symbol = code.width() as u32;
    let modules = symbol + 2 * QUIET_ZONE;
    let tile = size.max(modules);
    let module_px = tile / modules;
    let offset = (tile - modules * module_px) / 2 + QUIET_ZONE * module_px;

    let mut img = RgbaImage::from_pixel(tile, tile, background);
    for qy in 0..symbol {
        for qx in 0..symbol {
            if code[(qx as usize, qy as usize)] != Color::Dark {
                continue;
            }
            let x0 = offset + qx * module_px;
            let y0 = offset + qy * module_px;
            for y in y0..y0 + module_px {
                for x in x0..x0 + module_px {
                    img.put_pixel(x, y, foreground);
                }
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn test_exact_size() {
        let img = generate("https://example.com", 170, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (170, 170));
        assert!(img.pixels().any(|p| *p == BLACK));
    }

    #[test]
    fn test_quiet_zone_is_background() {
        let img = generate("hello", 200, BLACK, WHITE).unwrap();
        for i in 0..200 {
            assert_eq!(*img.get_pixel(i, 0), WHITE);
            assert_eq!(*img.get_pixel(0, i), WHITE);
        }
    }

    #[test]
    fn test_custom_colors() {
        let fg = Rgba([200, 0, 0, 255]);
        let bg = Rgba([0, 0, 200, 255]);
        let img = generate("colors", 100, fg, bg).unwrap();
        assert!(img.pixels().all(|p| *p == fg || *p == bg));
        assert!(img.pixels().any(|p| *p == fg));
    }

    #[test]
    fn test_too_small_grows_to_symbol() {
        // Version 1 symbol: 21 modules + 8 quiet = 29 pixels minimum.
        let img = generate("a", 10, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (29, 29));
    }

    #[test]
    fn test_finder_pattern_is_dark() {
        // One pixel per module at minimum size: the top-left finder corner
        // sits right after the quiet zone.
        let img = generate("a", 29, BLACK, WHITE).unwrap();
        assert_eq!(*img.get_pixel(QUIET_ZONE, QUIET_ZONE), BLACK);
    }

    #[test]
    fn test_oversized_content_fails() {
        let content = "x".repeat(5000);
        assert!(matches!(
            generate(&content, 100, BLACK, WHITE),
            Err(PosterError::QrCode(_))
        ));
    }
}
