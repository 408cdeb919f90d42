//! Request types for a poster render.
//!
//! Field names on the wire are snake_case. Every field is optional when
//! deserializing; missing values are zero or empty and get defaulted (or
//! rejected) by [`PosterParam::validate`](super::PosterParam::validate).
//! Raw image bytes travel as standard base64 strings.

use serde::{Deserialize, Serialize};

/// Top-level render request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosterParam {
    /// Canvas width in pixels (default 720).
    #[serde(default)]
    pub width: i32,
    /// Canvas height in pixels (default 1280).
    #[serde(default)]
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_images: Vec<Image>,
    #[serde(default, rename = "sub_qr_code", skip_serializing_if = "Vec::is_empty")]
    pub sub_qr_codes: Vec<QrCode>,
    #[serde(default, rename = "sub_wx_qr_code", skip_serializing_if = "Vec::is_empty")]
    pub sub_wx_qr_codes: Vec<WxQrCode>,
}

/// Where an image comes from. Inline bytes win over a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Bytes(&'a [u8]),
    Url(&'a str),
}

/// Pick the image source, preferring inline bytes.
fn pick_source<'a>(bytes: &'a [u8], url: &'a str) -> Option<ImageSource<'a>> {
    if !bytes.is_empty() {
        Some(ImageSource::Bytes(bytes))
    } else if !url.is_empty() {
        Some(ImageSource::Url(url))
    } else {
        None
    }
}

/// Poster background, stretched to the canvas size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Background {
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<u8>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    /// `jpg` | `jpeg` | `png` (default `jpg`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_type: String,
}

impl Background {
    pub fn source(&self) -> Option<ImageSource<'_>> {
        pick_source(&self.image, &self.image_url)
    }
}

/// Position and footprint shared by every placed element.
///
/// QR codes and mini-program codes are square and only use `width`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubObject {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

/// A block of wrapped text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Text {
    #[serde(flatten)]
    pub frame: SubObject,
    /// Width units per line; Han characters count 2, others 1 (default 1).
    #[serde(default, rename = "line_count")]
    pub line_char_budget: u32,
    #[serde(default)]
    pub content: String,
    /// Font file name inside the font directory (default `default.ttc`).
    #[serde(default)]
    pub font_name: String,
    /// Points (default 24).
    #[serde(default)]
    pub font_size: f32,
    /// Baseline advance multiplier (default 1.5).
    #[serde(default)]
    pub line_height: f32,
    /// Hex color (default `#000000`).
    #[serde(default)]
    pub font_color: String,
}

/// A bitmap overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(flatten)]
    pub frame: SubObject,
    /// Pixels taken off width and height before the first resize.
    #[serde(default)]
    pub padding: i32,
    /// Clockwise rotation in radians.
    #[serde(default)]
    pub angle: f64,
    /// Hex fill for the corners uncovered by rotation.
    #[serde(default)]
    pub color: String,
    /// `jpg` | `jpeg` | `png`; anything else skips the element.
    #[serde(default)]
    pub image_type: String,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<u8>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
}

impl Image {
    pub fn source(&self) -> Option<ImageSource<'_>> {
        pick_source(&self.image, &self.image_url)
    }
}

/// A QR code generated locally from `content`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QrCode {
    #[serde(flatten)]
    pub frame: SubObject,
    #[serde(default)]
    pub angle: f64,
    /// Default `#FFFFFF`.
    #[serde(default)]
    pub background_color: String,
    /// Default `#000000`.
    #[serde(default)]
    pub foreground_color: String,
    #[serde(default)]
    pub content: String,
}

/// A mini-program code generated by the remote code service.
///
/// The token is passed through on every request; it is never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WxQrCode {
    #[serde(flatten)]
    pub frame: SubObject,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub auto_color: bool,
    /// Default `#000000`.
    #[serde(default)]
    pub line_color: String,
    #[serde(default)]
    pub is_hyaline: bool,
}

/// Base64 (standard alphabet) encoding for byte fields.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) if !encoded.is_empty() => STANDARD
                .decode(encoded.trim())
                .map_err(|e| de::Error::custom(format!("invalid base64 image: {}", e))),
            _ => Ok(Vec::new()),
        }
    }
}
