//! # Rendering Module
//!
//! The composition engine: turns a validated request into a JPEG poster.
//!
//! ## Modules
//!
//! - [`codec`]: image type tags, decoding and JPEG encoding
//! - [`transform`]: resize, rotation and center-anchored placement
//! - [`qr`]: QR symbols at an exact pixel size
//! - [`stage`]: the ordered drawing pipeline
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use poster::{Poster, PosterConfig, PosterParam};
//! use poster::source::MemoryLoader;
//!
//! # async fn example(param: PosterParam) -> poster::Result<()> {
//! let engine = Poster::new(PosterConfig::default(), Arc::new(MemoryLoader::new()))?;
//! let jpeg = engine.render(param).await?;
//! std::fs::write("poster.jpg", jpeg)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod qr;
pub mod stage;
pub mod transform;

use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::PosterConfig;
use crate::error::Result;
use crate::param::{PosterParam, ValidPoster};
use crate::source::{HttpLoader, SourceLoader};
use crate::text::FontCache;
use stage::{PIPELINE, RenderState, StageContext};

/// The poster composition engine.
///
/// Cheap to share behind an `Arc`; concurrent renders only share the font
/// cache and the loader.
pub struct Poster {
    config: PosterConfig,
    fonts: Arc<FontCache>,
    loader: Arc<dyn SourceLoader>,
}

impl Poster {
    pub fn new(config: PosterConfig, loader: Arc<dyn SourceLoader>) -> Result<Self> {
        config.validate()?;
        let fonts = Arc::new(FontCache::new(config.font_dir.clone()));
        Ok(Self {
            config,
            fonts,
            loader,
        })
    }

    /// Engine fetching over HTTP with the configured timeout.
    pub fn from_config(config: PosterConfig) -> Result<Self> {
        let loader = HttpLoader::new(&config)?;
        Self::new(config, Arc::new(loader))
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Font cache shared by every render of this engine.
    pub fn fonts(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    /// Validate `param` and render it to JPEG bytes.
    pub async fn render(&self, param: PosterParam) -> Result<Vec<u8>> {
        let valid = param.validate()?;
        self.render_valid(&valid).await
    }

    /// Render an already validated request to JPEG bytes.
    pub async fn render_valid(&self, poster: &ValidPoster) -> Result<Vec<u8>> {
        let started = Instant::now();
        let canvas = self.compose(poster).await?;
        let jpeg = codec::encode_jpeg(&canvas, self.config.jpeg_quality)?;

        info!(
            width = poster.width(),
            height = poster.height(),
            bytes = jpeg.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "poster rendered"
        );
        Ok(jpeg)
    }

    /// Run every drawing stage and return the raw canvas.
    pub async fn compose(&self, poster: &ValidPoster) -> Result<RgbaImage> {
        let ctx = StageContext {
            fonts: &self.fonts,
            loader: self.loader.as_ref(),
        };

        let mut state = RenderState::Empty;
        let mut canvas = RgbaImage::new(poster.width(), poster.height());
        for stage in PIPELINE {
            let started = Instant::now();
            canvas = stage.run(canvas, poster, &ctx).await?;
            debug_assert_eq!(state.next(), Some(stage.completes()));
            state = stage.completes();
            debug!(
                stage = stage.name(),
                ?state,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage complete"
            );
        }
        Ok(canvas)
    }
}

impl std::fmt::Debug for Poster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poster")
            .field("config", &self.config)
            .field("fonts", &self.fonts.len())
            .finish_non_exhaustive()
    }
}
