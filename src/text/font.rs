//! Font loading and the process-wide font cache.
//!
//! Fonts are read from a directory on first use and parsed with ab_glyph.
//! Parsed fonts are immutable and cheaply clonable ([`FontArc`]), so the
//! cache hands out clones and never mutates an entry once inserted.

use ab_glyph::FontArc;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{PosterError, Result};

/// Font used when a text block does not name one.
pub const DEFAULT_FONT_NAME: &str = "default.ttc";

/// Append-only cache of parsed fonts keyed by file name.
///
/// Two callers missing on the same name at the same time both load and parse
/// the file; the later insert replaces the earlier one. Font bytes are
/// deterministic per name, so either value is correct and no caller ever sees
/// a partially initialized font. Failed loads are not cached.
#[derive(Debug)]
pub struct FontCache {
    font_dir: PathBuf,
    fonts: RwLock<HashMap<String, FontArc>>,
}

impl FontCache {
    /// Create an empty cache reading fonts from `font_dir`.
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_dir: font_dir.into(),
            fonts: RwLock::new(HashMap::new()),
        }
    }

    /// Directory fonts are loaded from.
    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// Get a font by file name, loading and caching it on first use.
    pub fn get(&self, name: &str) -> Result<FontArc> {
        if let Some(font) = self.lookup(name) {
            return Ok(font);
        }

        let font = load_font(&self.font_dir, name)?;
        tracing::debug!(font = name, "font loaded");

        let mut fonts = self.fonts.write().unwrap_or_else(|e| e.into_inner());
        fonts.insert(name.to_string(), font.clone());
        Ok(font)
    }

    /// Whether `name` has already been loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of cached fonts.
    pub fn len(&self) -> usize {
        self.fonts.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str) -> Option<FontArc> {
        // Entries are never mutated, so a poisoned lock still holds valid fonts.
        self.fonts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

/// Read and parse `<font_dir>/<name>`.
///
/// Names containing path separators or `..` are rejected as not found so a
/// request cannot read files outside the font directory.
fn load_font(font_dir: &Path, name: &str) -> Result<FontArc> {
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return Err(PosterError::FontNotFound(name.to_string()));
    }

    let path = font_dir.join(name);
    let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PosterError::FontNotFound(path.display().to_string()),
        _ => PosterError::Io(e),
    })?;

    FontArc::try_from_vec(bytes)
        .map_err(|e| PosterError::FontParse(format!("{}: {}", path.display(), e)))
}
