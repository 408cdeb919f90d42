//! # Poster - Declarative Poster Compositing
//!
//! Poster turns a flat description of a poster into a JPEG. A request names
//! a canvas size, a background and ordered lists of overlays:
//!
//! - **Sub-images**: resized, padded and optionally rotated bitmaps
//! - **QR codes**: generated locally at high error correction
//! - **Mini-program codes**: fetched from a remote code service
//! - **Texts**: width-aware wrapped lines in any TrueType font
//!
//! Layers are drawn in that order over the background, then the canvas is
//! encoded as JPEG.
//!
//! ## Quick Start
//!
//! ```no_run
//! use poster::{Poster, PosterConfig, PosterParam};
//!
//! # async fn example() -> poster::Result<()> {
//! let param: PosterParam = serde_json::from_str(r##"{
//!     "background": {"image_url": "https://example.com/bg.jpg"},
//!     "texts": [{"top": 176, "left": 166, "width": 600, "height": 56,
//!                "line_count": 20, "content": "Hello", "font_size": 50}]
//! }"##).unwrap();
//!
//! let engine = Poster::from_config(PosterConfig::default())?;
//! let jpeg = engine.render(param).await?;
//! std::fs::write("poster.jpg", jpeg)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`param`] | Request types, defaults and validation |
//! | [`render`] | Composition engine and drawing pipeline |
//! | [`text`] | Line wrapping, font cache and glyph drawing |
//! | [`source`] | Image downloads and the mini-program code service |
//! | [`server`] | HTTP transport |
//! | [`color`] | Hex color parsing |
//! | [`config`] | Engine settings |
//! | [`error`] | Error types |

pub mod color;
pub mod config;
pub mod error;
pub mod param;
pub mod render;
pub mod server;
pub mod source;
pub mod text;

// Re-exports for convenience
pub use config::PosterConfig;
pub use error::{PosterError, Result};
pub use param::PosterParam;
pub use render::Poster;
