//! Rasterizing wrapped text onto the canvas.
//!
//! Glyphs are laid out left to right with ab_glyph advances and kerning, then
//! their coverage is alpha-blended onto the canvas in the requested color.
//! Every pixel write is clipped to the text block's rectangle.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};

/// Axis-aligned clip rectangle, `x0..x1` × `y0..y1` (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl ClipRect {
    /// Rectangle covering `width × height` pixels starting at `(left, top)`.
    pub fn from_block(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            x0: left as i64,
            y0: top as i64,
            x1: left as i64 + width as i64,
            y1: top as i64 + height as i64,
        }
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// A block of text lines sharing one font, size and color.
pub struct TextRun<'a> {
    pub font: &'a FontArc,
    /// Size in points; one point is one pixel per em.
    pub font_size: f32,
    /// Baseline advance as a multiple of the font size.
    pub line_height: f32,
    pub color: Rgba<u8>,
    pub left: i32,
    pub top: i32,
    pub clip: ClipRect,
}

impl TextRun<'_> {
    /// Scale that maps one em to `font_size` pixels.
    pub fn px_scale(&self) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(self.font_size * self.font.height_unscaled() / units_per_em)
    }

    /// Baseline of line `index`, in canvas pixels.
    pub fn baseline(&self, index: usize) -> f32 {
        self.top as f32 + self.font_size.floor() + index as f32 * self.font_size * self.line_height
    }

    /// Draw `lines` onto `canvas`, one baseline per line.
    ///
    /// Returns the number of pixels touched, which is zero when everything
    /// falls outside the clip rectangle.
    pub fn draw<I, S>(&self, canvas: &mut RgbaImage, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scale = self.px_scale();
        let scaled = self.font.as_scaled(scale);
        let clip = self.clip_to_canvas(canvas);
        let mut touched = 0;

        for (index, line) in lines.into_iter().enumerate() {
            let baseline = self.baseline(index);
            let mut caret = self.left as f32;
            let mut previous: Option<GlyphId> = None;

            for ch in line.as_ref().chars() {
                let glyph_id = self.font.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, glyph_id);
                }

                let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
                if let Some(outlined) = self.font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|px, py, coverage| {
                        let x = bounds.min.x as i64 + px as i64;
                        let y = bounds.min.y as i64 + py as i64;
                        if coverage > 0.0 && clip.contains(x, y) {
                            blend(canvas.get_pixel_mut(x as u32, y as u32), self.color, coverage);
                            touched += 1;
                        }
                    });
                }

                caret += scaled.h_advance(glyph_id);
                previous = Some(glyph_id);
            }
        }

        touched
    }

    fn clip_to_canvas(&self, canvas: &RgbaImage) -> ClipRect {
        ClipRect {
            x0: self.clip.x0.max(0),
            y0: self.clip.y0.max(0),
            x1: self.clip.x1.min(canvas.width() as i64),
            y1: self.clip.y1.min(canvas.height() as i64),
        }
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.min(1.0) * color[3] as f32 / 255.0;
    let inverse = 1.0 - alpha;
    for channel in 0..3 {
        let mixed = color[channel] as f32 * alpha + dst[channel] as f32 * inverse;
        dst[channel] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    let out_alpha = alpha * 255.0 + dst[3] as f32 * inverse;
    dst[3] = out_alpha.round().clamp(0.0, 255.0) as u8;
}
