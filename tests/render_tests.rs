//! End-to-end rendering tests against the public API.
//!
//! Remote collaborators are replaced by an in-memory loader; fonts come from
//! a scratch directory holding DejaVu Sans as `default.ttc`.

use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use poster::param::{Background, Image, QrCode, SubObject, Text, WxQrCode};
use poster::source::MemoryLoader;
use poster::{Poster, PosterConfig, PosterError, PosterParam};

const DEJAVU: &[u8] = include_bytes!("../resources/fonts/DejaVuSans.ttf");

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn font_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("poster-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("default.ttc"), DEJAVU).unwrap();
    dir
}

fn engine(loader: MemoryLoader) -> Poster {
    let config = PosterConfig {
        font_dir: font_dir(),
        ..Default::default()
    };
    Poster::new(config, Arc::new(loader)).unwrap()
}

fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, color)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn white_background() -> Option<Background> {
    Some(Background {
        image: png(8, 8, WHITE),
        image_type: "png".into(),
        ..Default::default()
    })
}

fn is_reddish(p: &Rgba<u8>) -> bool {
    p[0] > 200 && p[1] < 60 && p[2] < 60
}

#[tokio::test]
async fn test_default_canvas_with_text_renders_jpeg() {
    let param = PosterParam {
        width: 720,
        height: 1280,
        background: white_background(),
        texts: vec![Text {
            frame: SubObject {
                top: 100,
                left: 100,
                width: 400,
                height: 80,
            },
            line_char_budget: 20,
            content: "爱".into(),
            font_size: 50.0,
            ..Default::default()
        }],
        ..Default::default()
    };

    let jpeg = engine(MemoryLoader::new()).render(param).await.unwrap();
    assert!(!jpeg.is_empty());
    let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (720, 1280));
}

#[tokio::test]
async fn test_all_default_text_renders_jpeg() {
    let param = PosterParam {
        background: white_background(),
        texts: vec![Text {
            content: "爱".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let engine = engine(MemoryLoader::new());
    let jpeg = engine.render(param).await.unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (720, 1280));
    assert!(engine.fonts().contains("default.ttc"));
}

#[tokio::test]
async fn test_text_is_drawn_in_its_block() {
    let param = PosterParam {
        width: 200,
        height: 100,
        background: white_background(),
        texts: vec![Text {
            frame: SubObject {
                top: 10,
                left: 10,
                width: 180,
                height: 60,
            },
            line_char_budget: 20,
            content: "Hello".into(),
            font_size: 40.0,
            font_color: "#FF0000".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let valid = param.validate().unwrap();
    let canvas = engine(MemoryLoader::new()).compose(&valid).await.unwrap();
    let (mut inside, mut outside) = (0, 0);
    for (x, y, p) in canvas.enumerate_pixels() {
        if *p != WHITE {
            if (10..190).contains(&x) && (10..70).contains(&y) {
                inside += 1;
            } else {
                outside += 1;
            }
        }
    }
    assert!(inside > 0);
    assert_eq!(outside, 0);
}

#[tokio::test]
async fn test_empty_background_fails_validation() {
    let param = PosterParam {
        background: Some(Background::default()),
        ..Default::default()
    };
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
}

#[tokio::test]
async fn test_gif_sub_image_skipped_but_gif_background_fails() {
    let mut param = PosterParam {
        width: 64,
        height: 64,
        background: white_background(),
        sub_images: vec![Image {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 32,
                height: 32,
            },
            image: png(4, 4, RED),
            image_type: "gif".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let valid = param.clone().validate().unwrap();
    let canvas = engine(MemoryLoader::new()).compose(&valid).await.unwrap();
    assert!(canvas.pixels().all(|p| *p == WHITE));

    param.background.as_mut().unwrap().image_type = "gif".into();
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
}

#[tokio::test]
async fn test_qr_codes_layer_over_sub_images() {
    let param = PosterParam {
        width: 100,
        height: 100,
        background: white_background(),
        sub_images: vec![Image {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 40,
                height: 40,
            },
            image: png(4, 4, RED),
            image_type: "png".into(),
            ..Default::default()
        }],
        sub_qr_codes: vec![QrCode {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 40,
                height: 0,
            },
            background_color: "#0000FF".into(),
            content: "x".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let valid = param.validate().unwrap();
    let canvas = engine(MemoryLoader::new()).compose(&valid).await.unwrap();
    // Both elements start at (20, 20); the QR quiet zone covers the image.
    assert_eq!(*canvas.get_pixel(22, 22), BLUE);
    assert_eq!(*canvas.get_pixel(10, 10), WHITE);
}

#[tokio::test]
async fn test_later_elements_draw_over_earlier_ones() {
    let frame = SubObject {
        top: 0,
        left: 0,
        width: 40,
        height: 40,
    };
    let sub_image = |color| Image {
        frame,
        image: png(4, 4, color),
        image_type: "png".into(),
        ..Default::default()
    };
    let qr = |background: &str| QrCode {
        frame: SubObject {
            top: 40,
            left: 40,
            width: 40,
            height: 0,
        },
        background_color: background.into(),
        content: "x".into(),
        ..Default::default()
    };
    let param = PosterParam {
        width: 120,
        height: 120,
        background: white_background(),
        sub_images: vec![sub_image(RED), sub_image(BLUE)],
        sub_qr_codes: vec![qr("#0000FF"), qr("#FF0000")],
        ..Default::default()
    };

    let valid = param.validate().unwrap();
    let canvas = engine(MemoryLoader::new()).compose(&valid).await.unwrap();
    // Sub-images start at (20, 20), QR tiles at (60, 60).
    let p = canvas.get_pixel(40, 40);
    assert!(p[2] > 200 && p[0] < 60, "unexpected color {:?}", p);
    assert_eq!(*canvas.get_pixel(62, 62), RED);
}

#[tokio::test]
async fn test_oversized_elements_rejected_before_drawing() {
    let param = PosterParam {
        background: white_background(),
        sub_qr_codes: vec![QrCode {
            frame: SubObject {
                width: i32::MAX,
                ..Default::default()
            },
            content: "x".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));

    let param = PosterParam {
        background: white_background(),
        sub_images: vec![Image {
            frame: SubObject {
                width: 10,
                height: 10,
                ..Default::default()
            },
            padding: i32::MIN,
            image: png(4, 4, RED),
            image_type: "png".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
}

#[tokio::test]
async fn test_sub_image_anchored_on_requested_size() {
    let param = PosterParam {
        width: 300,
        height: 300,
        background: white_background(),
        sub_images: vec![Image {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 100,
                height: 100,
            },
            image_url: "http://img/red.png".into(),
            image_type: "PNG".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let loader = MemoryLoader::new().with_image("http://img/red.png", png(200, 200, RED));
    let valid = param.validate().unwrap();
    let canvas = engine(loader).compose(&valid).await.unwrap();
    // Origin (50, 50), footprint 100×100.
    assert!(is_reddish(canvas.get_pixel(60, 60)));
    assert!(is_reddish(canvas.get_pixel(140, 140)));
    assert_eq!(*canvas.get_pixel(160, 160), WHITE);
    assert_eq!(*canvas.get_pixel(40, 40), WHITE);
}

#[tokio::test]
async fn test_wx_code_anchored_on_returned_bitmap() {
    let param = PosterParam {
        width: 300,
        height: 300,
        background: white_background(),
        sub_wx_qr_codes: vec![WxQrCode {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 100,
                height: 0,
            },
            access_token: "token".into(),
            scene: "id=7".into(),
            line_color: "#102030".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let loader = Arc::new(MemoryLoader::new().with_wxa_code(png(200, 200, RED)));
    let config = PosterConfig {
        font_dir: font_dir(),
        ..Default::default()
    };
    let engine = Poster::new(config, loader.clone()).unwrap();
    let valid = param.validate().unwrap();
    let canvas = engine.compose(&valid).await.unwrap();

    // The service returned 200×200, so the origin is (100, 100) even though
    // the drawn code is only 100×100.
    assert_eq!(*canvas.get_pixel(60, 60), WHITE);
    assert!(is_reddish(canvas.get_pixel(110, 110)));
    assert!(is_reddish(canvas.get_pixel(190, 190)));
    assert_eq!(*canvas.get_pixel(210, 210), WHITE);

    let requests = loader.wxa_requests();
    assert_eq!(requests.len(), 1);
    let (token, request) = &requests[0];
    assert_eq!(token, "token");
    assert_eq!(request.scene, "id=7");
    assert_eq!(request.width, 100);
    let line_color = request.line_color;
    assert_eq!((line_color.r, line_color.g, line_color.b), (0x10, 0x20, 0x30));
}

#[tokio::test]
async fn test_fetch_failure_aborts_render() {
    let param = PosterParam {
        background: white_background(),
        sub_images: vec![Image {
            image_url: "http://img/missing.png".into(),
            image_type: "png".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Fetch(_)));
}

#[tokio::test]
async fn test_remote_code_error_aborts_render() {
    let param = PosterParam {
        background: white_background(),
        sub_wx_qr_codes: vec![WxQrCode {
            access_token: "expired".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = engine(MemoryLoader::new()).render(param).await.unwrap_err();
    assert!(matches!(err, PosterError::Remote { .. }));
}

#[tokio::test]
async fn test_concurrent_renders_share_one_font() {
    let engine = engine(MemoryLoader::new());
    let param = PosterParam {
        width: 120,
        height: 60,
        background: white_background(),
        texts: vec![Text {
            frame: SubObject {
                top: 0,
                left: 0,
                width: 120,
                height: 60,
            },
            line_char_budget: 10,
            content: "poster".into(),
            ..Default::default()
        }],
        ..Default::default()
    };

    let (a, b) = tokio::join!(engine.render(param.clone()), engine.render(param));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(engine.fonts().len(), 1);
}
