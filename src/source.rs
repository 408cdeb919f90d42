//! Remote collaborators: image downloads and the mini-program code service.
//!
//! The render pipeline only sees the [`SourceLoader`] trait. [`HttpLoader`]
//! talks to the network with reqwest; [`MemoryLoader`] serves canned bytes
//! for offline rendering and tests.

use async_trait::async_trait;
use image::Rgba;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::PosterConfig;
use crate::error::{PosterError, Result};
use crate::param::WxQrCode;

/// Longest slice of a response body kept in error messages.
const BODY_PREVIEW_CHARS: usize = 512;

/// Line color of a mini-program code, as the service expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgba<u8>> for LineColor {
    fn from(color: Rgba<u8>) -> Self {
        Self {
            r: color[0],
            g: color[1],
            b: color[2],
        }
    }
}

/// JSON body of a mini-program code request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WxCodeRequest {
    pub scene: String,
    pub page: String,
    pub width: i32,
    pub auto_color: bool,
    pub line_color: LineColor,
    pub is_hyaline: bool,
}

impl WxCodeRequest {
    pub fn new(code: &WxQrCode, line_color: Rgba<u8>) -> Self {
        Self {
            scene: code.scene.clone(),
            page: code.page.clone(),
            width: code.frame.width,
            auto_color: code.auto_color,
            line_color: line_color.into(),
            is_hyaline: code.is_hyaline,
        }
    }
}

/// Fetches the bytes the pipeline cannot produce itself.
///
/// Implementations must not retry: a failure is final for the render.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Download the image at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Ask the code service for a mini-program code bitmap.
    async fn wxa_code(&self, access_token: &str, request: &WxCodeRequest) -> Result<Vec<u8>>;
}

/// Network-backed loader.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    wxa_endpoint: String,
}

impl HttpLoader {
    pub fn new(config: &PosterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| PosterError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            wxa_endpoint: config.wxa_endpoint.clone(),
        })
    }
}

#[async_trait]
impl SourceLoader for HttpLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PosterError::Fetch(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(PosterError::Fetch(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PosterError::Fetch(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    async fn wxa_code(&self, access_token: &str, request: &WxCodeRequest) -> Result<Vec<u8>> {
        let query = [("access_token", access_token)];
        let url = reqwest::Url::parse_with_params(&self.wxa_endpoint, &query)
            .map_err(|e| PosterError::Config(format!("invalid mini-program endpoint: {}", e)))?;
        let body = serde_json::to_vec(request)
            .map_err(|e| PosterError::Encode(format!("mini-program request: {}", e)))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| PosterError::Fetch(format!("mini-program code request failed: {}", e)))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PosterError::Fetch(format!("mini-program code response: {}", e)))?;

        // Errors come back as 200 with a JSON `{errcode, errmsg}` body.
        if !status.is_success() || is_json || bytes.is_empty() {
            return Err(PosterError::Remote {
                status: status.as_u16(),
                body: body_preview(&bytes),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Lossy, truncated text of a response body for diagnostics.
pub fn body_preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() <= BODY_PREVIEW_CHARS {
        text.into_owned()
    } else {
        let mut preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
        preview.push('…');
        preview
    }
}

/// In-memory loader serving registered bytes.
///
/// Mini-program requests are recorded so callers can inspect what would
/// have been sent.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    images: HashMap<String, Vec<u8>>,
    wxa_code: Option<Vec<u8>>,
    requests: Mutex<Vec<(String, WxCodeRequest)>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn with_image(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(url.into(), bytes);
        self
    }

    /// Answer every mini-program request with `bytes`.
    pub fn with_wxa_code(mut self, bytes: Vec<u8>) -> Self {
        self.wxa_code = Some(bytes);
        self
    }

    /// Mini-program requests received so far, with their access tokens.
    pub fn wxa_requests(&self) -> Vec<(String, WxCodeRequest)> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SourceLoader for MemoryLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.images.get(url).cloned().ok_or_else(|| {
            PosterError::Fetch(format!("Failed to download {}: HTTP 404 Not Found", url))
        })
    }

    async fn wxa_code(&self, access_token: &str, request: &WxCodeRequest) -> Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((access_token.to_string(), request.clone()));
        self.wxa_code.clone().ok_or_else(|| PosterError::Remote {
            status: 200,
            body: r#"{"errcode":40001,"errmsg":"invalid credential"}"#.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::SubObject;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_body_shape() {
        let code = WxQrCode {
            frame: SubObject {
                width: 280,
                ..Default::default()
            },
            scene: "id=42".into(),
            page: "pages/index/index".into(),
            auto_color: true,
            is_hyaline: true,
            access_token: "secret".into(),
            ..Default::default()
        };
        let request = WxCodeRequest::new(&code, Rgba([1, 2, 3, 255]));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "scene": "id=42",
                "page": "pages/index/index",
                "width": 280,
                "auto_color": true,
                "line_color": {"r": 1, "g": 2, "b": 3},
                "is_hyaline": true
            })
        );
        // The token travels in the query string, never in the body.
        assert!(!json.to_string().contains("secret"));
    }

    #[test]
    fn test_body_preview_truncates() {
        assert_eq!(body_preview(b"short"), "short");
        let long = "x".repeat(BODY_PREVIEW_CHARS + 10);
        let preview = body_preview(long.as_bytes());
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_http_loader_builds_from_default_config() {
        assert!(HttpLoader::new(&PosterConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_http_loader_rejects_relative_url() {
        let loader = HttpLoader::new(&PosterConfig::default()).unwrap();
        let err = loader.fetch("images/bg.jpg").await.unwrap_err();
        assert!(matches!(err, PosterError::Fetch(_)));
        assert!(err.to_string().contains("images/bg.jpg"));
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryLoader::new()
            .with_image("http://img/a.png", vec![1, 2])
            .with_wxa_code(vec![7]);

        assert_eq!(loader.fetch("http://img/a.png").await.unwrap(), vec![1, 2]);
        assert!(matches!(
            loader.fetch("http://img/missing.png").await,
            Err(PosterError::Fetch(_))
        ));

        let request = WxCodeRequest::new(&WxQrCode::default(), Rgba([0, 0, 0, 255]));
        assert_eq!(loader.wxa_code("tok", &request).await.unwrap(), vec![7]);
        assert_eq!(loader.wxa_requests(), vec![("tok".to_string(), request)]);
    }

    #[tokio::test]
    async fn test_memory_loader_without_code_reports_remote_error() {
        let loader = MemoryLoader::new();
        let request = WxCodeRequest::new(&WxQrCode::default(), Rgba([0, 0, 0, 255]));
        let err = loader.wxa_code("tok", &request).await.unwrap_err();
        assert!(err.to_string().contains("40001"));
    }
}
