//! # Text
//!
//! Everything needed to put a text block on a poster:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Width-aware line wrapping (Han characters count double) |
//! | [`font`] | Font loading and the shared [`FontCache`] |
//! | [`draw`] | Glyph rasterization with clipping and color blending |

pub mod draw;
pub mod font;
pub mod layout;

pub use draw::{ClipRect, TextRun};
pub use font::{DEFAULT_FONT_NAME, FontCache};
pub use layout::{Lines, wrap};
