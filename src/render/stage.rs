//! The ordered render pipeline.
//!
//! A render walks [`RenderState`] from `Empty` to `Encoded`. Each [`Stage`]
//! takes the canvas, draws one layer and hands the canvas back; the first
//! error stops the walk.

use image::{
    RgbaImage,
    imageops::{self, FilterType},
};
use std::borrow::Cow;
use tracing::{debug, warn};

use super::codec::{self, ImageType};
use super::qr;
use super::transform::{
    self, ElementTransform, anchor_from_corner, center_crop_offset, clamp_dim,
};
use crate::color::{self, TRANSPARENT, WHITE};
use crate::error::{PosterError, Result};
use crate::param::{Image, ImageSource, QrCode, Text, ValidPoster, WxQrCode};
use crate::source::{SourceLoader, WxCodeRequest, body_preview};
use crate::text::{ClipRect, FontCache, TextRun, wrap};

/// Progress of a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Empty,
    BackgroundDrawn,
    ImagesDrawn,
    QrDrawn,
    WxQrDrawn,
    TextDrawn,
    Encoded,
}

impl RenderState {
    /// The state that follows this one, `None` once encoded.
    pub fn next(self) -> Option<RenderState> {
        match self {
            RenderState::Empty => Some(RenderState::BackgroundDrawn),
            RenderState::BackgroundDrawn => Some(RenderState::ImagesDrawn),
            RenderState::ImagesDrawn => Some(RenderState::QrDrawn),
            RenderState::QrDrawn => Some(RenderState::WxQrDrawn),
            RenderState::WxQrDrawn => Some(RenderState::TextDrawn),
            RenderState::TextDrawn => Some(RenderState::Encoded),
            RenderState::Encoded => None,
        }
    }
}

/// One drawing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Background,
    Images,
    QrCodes,
    WxQrCodes,
    Texts,
}

/// Drawing layers in compositing order.
pub const PIPELINE: [Stage; 5] = [
    Stage::Background,
    Stage::Images,
    Stage::QrCodes,
    Stage::WxQrCodes,
    Stage::Texts,
];

/// Shared collaborators a stage may call.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub fonts: &'a FontCache,
    pub loader: &'a dyn SourceLoader,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Background => "background",
            Stage::Images => "sub_images",
            Stage::QrCodes => "sub_qr_code",
            Stage::WxQrCodes => "sub_wx_qr_code",
            Stage::Texts => "texts",
        }
    }

    /// State reached once this stage has drawn.
    pub fn completes(self) -> RenderState {
        match self {
            Stage::Background => RenderState::BackgroundDrawn,
            Stage::Images => RenderState::ImagesDrawn,
            Stage::QrCodes => RenderState::QrDrawn,
            Stage::WxQrCodes => RenderState::WxQrDrawn,
            Stage::Texts => RenderState::TextDrawn,
        }
    }

    /// Draw this layer onto `canvas`.
    pub async fn run(
        self,
        mut canvas: RgbaImage,
        poster: &ValidPoster,
        ctx: &StageContext<'_>,
    ) -> Result<RgbaImage> {
        match self {
            Stage::Background => {
                let bytes = resolve(poster.background().source(), ctx.loader).await?;
                let decoded = codec::decode(&bytes, poster.background_type())?;
                draw_background(&mut canvas, &decoded);
            }
            Stage::Images => {
                for (index, image) in poster.sub_images().iter().enumerate() {
                    draw_sub_image(&mut canvas, index, image, ctx.loader).await?;
                }
            }
            Stage::QrCodes => {
                for qr in poster.qr_codes() {
                    draw_qr(&mut canvas, qr)?;
                }
            }
            Stage::WxQrCodes => {
                for code in poster.wx_qr_codes() {
                    draw_wx_qr(&mut canvas, code, ctx.loader).await?;
                }
            }
            Stage::Texts => {
                for text in poster.texts() {
                    draw_text(&mut canvas, text, ctx.fonts)?;
                }
            }
        }
        Ok(canvas)
    }
}

async fn resolve<'a>(
    source: Option<ImageSource<'a>>,
    loader: &dyn SourceLoader,
) -> Result<Cow<'a, [u8]>> {
    match source {
        Some(ImageSource::Bytes(bytes)) => Ok(Cow::Borrowed(bytes)),
        Some(ImageSource::Url(url)) => {
            debug!(url, "fetching image");
            Ok(Cow::Owned(loader.fetch(url).await?))
        }
        None => Err(PosterError::Validation("image source cannot be empty".into())),
    }
}

/// Stretch the background over the whole canvas.
fn draw_background(canvas: &mut RgbaImage, decoded: &RgbaImage) {
    let (width, height) = canvas.dimensions();
    let resized = imageops::resize(decoded, width, height, FilterType::Lanczos3);
    let dx = center_crop_offset(resized.width(), width);
    let dy = center_crop_offset(resized.height(), height);
    imageops::replace(canvas, &resized, -dx, -dy);
}

async fn draw_sub_image(
    canvas: &mut RgbaImage,
    index: usize,
    image: &Image,
    loader: &dyn SourceLoader,
) -> Result<()> {
    let kind = match ImageType::parse(&image.image_type) {
        Ok(kind) => kind,
        Err(e) => {
            warn!(index, error = %e, "skipping sub-image");
            return Ok(());
        }
    };

    let bytes = resolve(image.source(), loader).await?;
    let decoded = match codec::decode(&bytes, kind) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(index, error = %e, "skipping sub-image");
            return Ok(());
        }
    };

    let fill = if image.angle != 0.0 {
        color::parse_optional(&image.color)?.unwrap_or(TRANSPARENT)
    } else {
        TRANSPARENT
    };
    let frame = image.frame;
    let element = ElementTransform {
        width: frame.width,
        height: frame.height,
        padding: image.padding,
        angle: image.angle,
        fill,
    }
    .apply(&decoded);

    let origin = anchor_from_corner(frame.top, frame.left, frame.width, frame.height);
    transform::composite(canvas, &element, origin);
    Ok(())
}

fn draw_qr(canvas: &mut RgbaImage, qr: &QrCode) -> Result<()> {
    let background = color::parse_hex(&qr.background_color)?;
    let foreground = color::parse_hex(&qr.foreground_color)?;
    let width = qr.frame.width;
    let size = clamp_dim(width);

    let mut tile = qr::generate(&qr.content, size, foreground, background)?;
    if qr.angle != 0.0 {
        tile = transform::rotate_into(&tile, qr.angle, size, size, background);
    }

    let origin = anchor_from_corner(qr.frame.top, qr.frame.left, width, width);
    transform::composite(canvas, &tile, origin);
    Ok(())
}

async fn draw_wx_qr(
    canvas: &mut RgbaImage,
    code: &WxQrCode,
    loader: &dyn SourceLoader,
) -> Result<()> {
    let line_color = color::parse_hex(&code.line_color)?;
    let request = WxCodeRequest::new(code, line_color);
    let bytes = loader.wxa_code(&code.access_token, &request).await?;

    let decoded = codec::decode_any(&bytes).map_err(|_| PosterError::Remote {
        status: 200,
        body: body_preview(&bytes),
    })?;
    let (returned_w, returned_h) = decoded.dimensions();

    let size = clamp_dim(code.frame.width);
    let mut element = imageops::resize(&decoded, size, size, FilterType::Lanczos3);
    if code.angle != 0.0 {
        element = transform::rotate_into(&element, code.angle, size, size, WHITE);
    }

    // Anchored on the bitmap the service returned, not the requested width.
    let origin = anchor_from_corner(
        code.frame.top,
        code.frame.left,
        returned_w as i32,
        returned_h as i32,
    );
    transform::composite(canvas, &element, origin);
    Ok(())
}

fn draw_text(canvas: &mut RgbaImage, text: &Text, fonts: &FontCache) -> Result<()> {
    let lines = wrap(&text.content, text.line_char_budget as usize);
    let font = fonts.get(&text.font_name)?;
    let color = color::parse_hex(&text.font_color)?;
    let frame = text.frame;

    let run = TextRun {
        font: &font,
        font_size: text.font_size,
        line_height: text.line_height,
        color,
        left: frame.left,
        top: frame.top,
        clip: ClipRect::from_block(frame.left, frame.top, frame.width, frame.height),
    };
    let touched = run.draw(canvas, lines);
    debug!(font = %text.font_name, touched, "text drawn");
    Ok(())
}
