//! Defaulting and validation of render requests.
//!
//! One ordered, fail-fast pass: canvas, background, texts, sub-images, QR
//! codes, mini-program codes. Defaults are written into the request; on
//! error the whole request is dropped so a half-defaulted value is never
//! observed.

use super::schema::{Background, Image, PosterParam, QrCode, SubObject, Text, WxQrCode};
use crate::error::{PosterError, Result};
use crate::render::codec::ImageType;
use crate::text::DEFAULT_FONT_NAME;

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: i32 = 720;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: i32 = 1280;
/// Largest accepted canvas edge.
pub const MAX_CANVAS_DIM: i32 = 10_000;
/// Largest accepted element edge, padding and font size.
pub const MAX_ELEMENT_DIM: i32 = MAX_CANVAS_DIM;
/// Default edge length of QR and mini-program codes.
pub const DEFAULT_CODE_WIDTH: i32 = 100;

pub const DEFAULT_FONT_SIZE: f32 = 24.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.5;
pub const DEFAULT_FONT_COLOR: &str = "#000000";
pub const DEFAULT_QR_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_QR_FOREGROUND: &str = "#000000";
pub const DEFAULT_LINE_COLOR: &str = "#000000";

/// A request that passed validation, with every default filled in.
///
/// Only [`PosterParam::validate`] can build one, so holding a `ValidPoster`
/// proves the rules below were applied.
#[derive(Debug, Clone)]
pub struct ValidPoster {
    param: PosterParam,
    background: Background,
    background_type: ImageType,
}

impl ValidPoster {
    pub fn width(&self) -> u32 {
        self.param.width as u32
    }

    pub fn height(&self) -> u32 {
        self.param.height as u32
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn background_type(&self) -> ImageType {
        self.background_type
    }

    pub fn texts(&self) -> &[Text] {
        &self.param.texts
    }

    pub fn sub_images(&self) -> &[Image] {
        &self.param.sub_images
    }

    pub fn qr_codes(&self) -> &[QrCode] {
        &self.param.sub_qr_codes
    }

    pub fn wx_qr_codes(&self) -> &[WxQrCode] {
        &self.param.sub_wx_qr_codes
    }

    /// The normalized request.
    pub fn param(&self) -> &PosterParam {
        &self.param
    }
}

impl PosterParam {
    /// Fill defaults and reject structurally invalid requests.
    ///
    /// ## Example
    ///
    /// ```
    /// use poster::param::{Background, PosterParam};
    ///
    /// let param = PosterParam {
    ///     background: Some(Background {
    ///         image_url: "https://example.com/bg.jpg".into(),
    ///         ..Default::default()
    ///     }),
    ///     ..Default::default()
    /// };
    /// let valid = param.validate().unwrap();
    /// assert_eq!((valid.width(), valid.height()), (720, 1280));
    /// ```
    pub fn validate(mut self) -> Result<ValidPoster> {
        self.width = canvas_dim(self.width, DEFAULT_WIDTH, "width")?;
        self.height = canvas_dim(self.height, DEFAULT_HEIGHT, "height")?;

        let mut background = self
            .background
            .take()
            .ok_or_else(|| invalid("background cannot be empty"))?;
        if background.source().is_none() {
            return Err(invalid(
                "background image and background image url cannot both be empty",
            ));
        }
        if background.image_type.is_empty() {
            background.image_type = "jpg".to_string();
        }
        let background_type = ImageType::parse(&background.image_type).map_err(|_| {
            invalid(&format!(
                "unsupported background image type {:?}, expected png or jpg",
                background.image_type
            ))
        })?;

        for (index, text) in self.texts.iter_mut().enumerate() {
            check_frame(&text.frame)
                .and_then(|()| check_font_metrics(text))
                .map_err(|msg| invalid(&format!("texts[{}]: {}", index, msg)))?;
            normalize_text(text).map_err(|msg| invalid(&format!("texts[{}]: {}", index, msg)))?;
        }

        for (index, image) in self.sub_images.iter().enumerate() {
            check_frame(&image.frame)
                .and_then(|()| check_length(image.padding, "padding"))
                .map_err(|msg| invalid(&format!("sub_images[{}]: {}", index, msg)))?;
            if image.source().is_none() {
                return Err(invalid(&format!(
                    "sub_images[{}]: image and image url cannot both be empty",
                    index
                )));
            }
        }

        for (index, qr) in self.sub_qr_codes.iter_mut().enumerate() {
            check_frame(&qr.frame)
                .map_err(|msg| invalid(&format!("sub_qr_code[{}]: {}", index, msg)))?;
            normalize_qr(qr).map_err(|msg| invalid(&format!("sub_qr_code[{}]: {}", index, msg)))?;
        }

        for (index, code) in self.sub_wx_qr_codes.iter_mut().enumerate() {
            check_frame(&code.frame)
                .map_err(|msg| invalid(&format!("sub_wx_qr_code[{}]: {}", index, msg)))?;
            normalize_wx(code)
                .map_err(|msg| invalid(&format!("sub_wx_qr_code[{}]: {}", index, msg)))?;
        }

        Ok(ValidPoster {
            param: self,
            background,
            background_type,
        })
    }
}

fn invalid(message: &str) -> PosterError {
    PosterError::Validation(message.to_string())
}

fn canvas_dim(value: i32, default: i32, name: &str) -> Result<i32> {
    match value {
        0 => Ok(default),
        v if v < 0 => Err(invalid(&format!("canvas {} cannot be negative", name))),
        v if v > MAX_CANVAS_DIM => Err(invalid(&format!(
            "canvas {} {} exceeds {}",
            name, v, MAX_CANVAS_DIM
        ))),
        v => Ok(v),
    }
}

/// Element sizes end up as pixel buffers, so they share the canvas bound.
fn check_frame(frame: &SubObject) -> std::result::Result<(), String> {
    check_length(frame.width, "width")?;
    check_length(frame.height, "height")
}

fn check_length(value: i32, name: &str) -> std::result::Result<(), String> {
    if (0..=MAX_ELEMENT_DIM).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} {} outside 0..={}", name, value, MAX_ELEMENT_DIM))
    }
}

fn check_font_metrics(text: &Text) -> std::result::Result<(), String> {
    let size_ok = text.font_size.is_finite()
        && (0.0..=MAX_ELEMENT_DIM as f32).contains(&text.font_size);
    if !size_ok {
        return Err(format!("font_size {} outside 0..={}", text.font_size, MAX_ELEMENT_DIM));
    }
    if !text.line_height.is_finite() || text.line_height < 0.0 {
        return Err(format!("line_height {} must be a non-negative number", text.line_height));
    }
    Ok(())
}

fn normalize_text(text: &mut Text) -> std::result::Result<(), &'static str> {
    if text.content.is_empty() {
        return Err("content cannot be empty");
    }
    if text.line_char_budget == 0 {
        text.line_char_budget = 1;
    }
    if text.font_color.is_empty() {
        text.font_color = DEFAULT_FONT_COLOR.to_string();
    }
    if text.font_size == 0.0 {
        text.font_size = DEFAULT_FONT_SIZE;
    }
    if text.line_height == 0.0 {
        text.line_height = DEFAULT_LINE_HEIGHT;
    }
    if text.font_name.is_empty() {
        text.font_name = DEFAULT_FONT_NAME.to_string();
    }
    Ok(())
}

fn normalize_qr(qr: &mut QrCode) -> std::result::Result<(), &'static str> {
    if qr.content.is_empty() {
        return Err("content cannot be empty");
    }
    if qr.background_color.is_empty() {
        qr.background_color = DEFAULT_QR_BACKGROUND.to_string();
    }
    if qr.foreground_color.is_empty() {
        qr.foreground_color = DEFAULT_QR_FOREGROUND.to_string();
    }
    if qr.frame.width == 0 {
        qr.frame.width = DEFAULT_CODE_WIDTH;
    }
    Ok(())
}

fn normalize_wx(code: &mut WxQrCode) -> std::result::Result<(), &'static str> {
    if code.access_token.is_empty() {
        return Err("access_token cannot be empty");
    }
    if code.frame.width == 0 {
        code.frame.width = DEFAULT_CODE_WIDTH;
    }
    if code.line_color.is_empty() {
        code.line_color = DEFAULT_LINE_COLOR.to_string();
    }
    Ok(())
}
