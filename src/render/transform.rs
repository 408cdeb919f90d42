//! Element geometry: resizing, rotation and placement.
//!
//! Placement arithmetic lives here as named functions so the slightly odd
//! anchoring rule is defined (and tested) in exactly one place.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::param::MAX_ELEMENT_DIM;

/// Draw origin for an element declared at `top`/`left` with the given size.
///
/// The declared offset is shifted by half the element's size on each axis:
/// the element's top-left pixel lands on `(left + width/2, top + height/2)`.
/// Halving truncates toward zero.
///
/// Returns `(x, y)`.
#[inline]
pub fn anchor_from_corner(top: i32, left: i32, width: i32, height: i32) -> (i64, i64) {
    (
        left as i64 + (width / 2) as i64,
        top as i64 + (height / 2) as i64,
    )
}

/// Source offset that centers a resized bitmap on a canvas axis.
#[inline]
pub fn center_crop_offset(resized: u32, canvas: u32) -> i64 {
    (resized as i64 - canvas as i64) / 2
}

/// Clamp a signed pixel length to a drawable size.
#[inline]
pub fn clamp_dim(value: i32) -> u32 {
    value.clamp(1, MAX_ELEMENT_DIM) as u32
}

/// Inner edge left after taking `padding` off `frame`.
///
/// Negative padding counts as none, so the inner edge never exceeds the frame.
#[inline]
pub fn padded_dim(frame: u32, padding: i32) -> u32 {
    (frame as i64 - padding.max(0) as i64).max(1) as u32
}

/// Resize to exactly `width × height`.
pub fn resize(src: &RgbaImage, width: u32, height: u32, filter: FilterType) -> RgbaImage {
    imageops::resize(src, width.max(1), height.max(1), filter)
}

/// Rotate `src` clockwise by `angle` radians into a `frame_w × frame_h` frame.
///
/// The source is centered in the frame. Frame pixels not covered by the
/// rotated source keep `fill`; translucent source pixels are blended over it.
/// Sampling is bilinear.
pub fn rotate_into(
    src: &RgbaImage,
    angle: f64,
    frame_w: u32,
    frame_h: u32,
    fill: Rgba<u8>,
) -> RgbaImage {
    let mut frame = RgbaImage::from_pixel(frame_w.max(1), frame_h.max(1), fill);
    if src.width() == 0 || src.height() == 0 {
        return frame;
    }

    let (sin, cos) = angle.sin_cos();
    let (src_w, src_h) = (src.width() as f64, src.height() as f64);
    let (half_fw, half_fh) = (frame.width() as f64 / 2.0, frame.height() as f64 / 2.0);

    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        let dx = x as f64 + 0.5 - half_fw;
        let dy = y as f64 + 0.5 - half_fh;

        // Inverse rotation maps the frame pixel back into the source.
        let sx = dx * cos + dy * sin + src_w / 2.0 - 0.5;
        let sy = -dx * sin + dy * cos + src_h / 2.0 - 0.5;

        if sx < -0.5 || sy < -0.5 || sx >= src_w - 0.5 || sy >= src_h - 0.5 {
            continue;
        }

        let sample = sample_bilinear(src, sx, sy);
        *pixel = over(sample, *pixel);
    }

    frame
}

fn sample_bilinear(src: &RgbaImage, sx: f64, sy: f64) -> Rgba<u8> {
    let max_x = src.width() as i64 - 1;
    let max_y = src.height() as i64 - 1;
    let (fx0, fy0) = (sx.floor(), sy.floor());
    let (tx, ty) = (sx - fx0, sy - fy0);
    let (x0, y0) = (fx0 as i64, fy0 as i64);

    let at = |x: i64, y: i64| *src.get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32);
    let (p00, p10, p01, p11) = (at(x0, y0), at(x0 + 1, y0), at(x0, y0 + 1), at(x0 + 1, y0 + 1));

    let mut out = [0u8; 4];
    for (c, value) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        *value = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Porter-Duff "over" of `top` onto `bottom`.
fn over(top: Rgba<u8>, bottom: Rgba<u8>) -> Rgba<u8> {
    let ta = top[3] as f64 / 255.0;
    if ta >= 1.0 {
        return top;
    }
    let ba = bottom[3] as f64 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (top[c] as f64 * ta + bottom[c] as f64 * ba * (1.0 - ta)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

/// Scale, rotate and re-scale a decoded bitmap into its final footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub width: i32,
    pub height: i32,
    /// Subtracted from both dimensions for the first resize. Negative
    /// values count as zero.
    pub padding: i32,
    /// Clockwise, radians. Zero skips rotation entirely.
    pub angle: f64,
    /// Corner fill while rotating.
    pub fill: Rgba<u8>,
}

impl ElementTransform {
    /// Produce the `width × height` bitmap to composite.
    ///
    /// 1. Lanczos3 resize to `(width - padding) × (height - padding)`.
    /// 2. If rotated, rotate into a `width × height` frame filled with `fill`.
    /// 3. Triangle resize to exactly `width × height`.
    pub fn apply(&self, src: &RgbaImage) -> RgbaImage {
        let (frame_w, frame_h) = (clamp_dim(self.width), clamp_dim(self.height));
        let inner_w = padded_dim(frame_w, self.padding);
        let inner_h = padded_dim(frame_h, self.padding);

        let mut staged = resize(src, inner_w, inner_h, FilterType::Lanczos3);
        if self.angle != 0.0 {
            staged = rotate_into(&staged, self.angle, frame_w, frame_h, self.fill);
        }
        resize(&staged, frame_w, frame_h, FilterType::Triangle)
    }
}

/// Alpha-composite `element` onto `canvas` with its top-left at `origin`.
///
/// Parts falling outside the canvas are dropped.
pub fn composite(canvas: &mut RgbaImage, element: &RgbaImage, origin: (i64, i64)) {
    imageops::overlay(canvas, element, origin.0, origin.1);
}
