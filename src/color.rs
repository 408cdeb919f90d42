//! Hex color parsing.
//!
//! Colors arrive as `#RRGGBB` or `RRGGBB` strings and are turned into opaque
//! [`Rgba`] pixels ready to be written onto the canvas.

use image::Rgba;

use crate::error::{PosterError, Result};

/// Opaque white, the default QR background.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Opaque black, the default text, QR foreground and line color.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fully transparent pixel, used where no fill color was requested.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Parse a hex color string into an opaque RGBA pixel.
///
/// The leading `#` is optional. Exactly six hex digits must remain.
///
/// ## Example
///
/// ```
/// use poster::color::parse_hex;
///
/// let color = parse_hex("#cc0033").unwrap();
/// assert_eq!(color.0, [0xcc, 0x00, 0x33, 0xff]);
/// ```
pub fn parse_hex(input: &str) -> Result<Rgba<u8>> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    // from_str_radix accepts a leading '+', so check the digits up front.
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PosterError::InvalidColor(input.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| PosterError::InvalidColor(input.to_string()))
    };

    Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

/// Parse an optional color, treating an empty string as "no color".
pub fn parse_optional(input: &str) -> Result<Option<Rgba<u8>>> {
    if input.is_empty() {
        Ok(None)
    } else {
        parse_hex(input).map(Some)
    }
}
