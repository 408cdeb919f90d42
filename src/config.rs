//! # Engine Configuration
//!
//! Settings the composition engine needs from its host process. The binary
//! fills this from command-line flags and environment variables; library
//! users can start from [`PosterConfig::default`].
//!
//! ```
//! use poster::PosterConfig;
//!
//! let config = PosterConfig {
//!     jpeg_quality: 90,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PosterError, Result};

/// Endpoint of the mini-program code service.
pub const DEFAULT_WXA_ENDPOINT: &str = "https://api.weixin.qq.com/wxa/getwxacodeunlimit";

/// Directory fonts are loaded from when none is configured.
pub const DEFAULT_FONT_DIR: &str = "./resources/fonts";

/// Composition engine settings.
#[derive(Debug, Clone)]
pub struct PosterConfig {
    /// Directory holding the font files text blocks refer to by name.
    pub font_dir: PathBuf,
    /// Mini-program code endpoint; the access token is appended as a query.
    pub wxa_endpoint: String,
    /// Timeout applied to every outgoing HTTP request.
    pub fetch_timeout: Duration,
    /// JPEG quality of the encoded poster (1-100).
    pub jpeg_quality: u8,
    pub user_agent: String,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from(DEFAULT_FONT_DIR),
            wxa_endpoint: DEFAULT_WXA_ENDPOINT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            jpeg_quality: 75,
            user_agent: format!("poster/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PosterConfig {
    /// Check values that would otherwise fail deep inside a render.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PosterError::Config(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.fetch_timeout.is_zero() {
            return Err(PosterError::Config("fetch timeout must be positive".into()));
        }
        if !self.wxa_endpoint.starts_with("http://") && !self.wxa_endpoint.starts_with("https://") {
            return Err(PosterError::Config(format!(
                "mini-program endpoint must be an http(s) URL, got {:?}",
                self.wxa_endpoint
            )));
        }
        Ok(())
    }
}
