//! # Poster Parameters
//!
//! The flat, declarative description of a poster: canvas size, background,
//! and ordered lists of texts, sub-images, QR codes and mini-program codes.
//!
//! ## Example
//!
//! ```
//! use poster::param::PosterParam;
//!
//! let json = r##"{
//!     "background": {"image_url": "https://example.com/bg.jpg"},
//!     "texts": [{"top": 176, "left": 166, "width": 600, "height": 56,
//!                "line_count": 20, "content": "Hello", "font_size": 50}],
//!     "sub_qr_code": [{"top": 940, "left": 23, "width": 170,
//!                      "content": "https://example.com"}]
//! }"##;
//!
//! let param: PosterParam = serde_json::from_str(json).unwrap();
//! let valid = param.validate().unwrap();
//! assert_eq!(valid.texts()[0].font_name, "default.ttc");
//! ```

mod schema;
mod validate;

pub use schema::{Background, Image, ImageSource, PosterParam, QrCode, SubObject, Text, WxQrCode};
pub use validate::{
    DEFAULT_CODE_WIDTH, DEFAULT_FONT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_LINE_COLOR,
    DEFAULT_LINE_HEIGHT, DEFAULT_QR_BACKGROUND, DEFAULT_QR_FOREGROUND, DEFAULT_WIDTH,
    MAX_CANVAS_DIM, MAX_ELEMENT_DIM, ValidPoster,
};
