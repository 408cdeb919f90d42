//! # Error Types
//!
//! This module defines the error type shared by the composition engine and
//! its transports.

use thiserror::Error;

/// Main error type for poster operations
#[derive(Debug, Error)]
pub enum PosterError {
    /// Missing or empty required field, rejected before any drawing
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// Hex color string that is not `#RRGGBB` / `RRGGBB`
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Image type tag other than jpg/jpeg/png
    #[error("Unsupported image type: {0:?}")]
    UnsupportedImageType(String),

    /// Malformed image bytes
    #[error("Decode error: {0}")]
    Decode(String),

    /// URL unreachable or non-success HTTP status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Mini-program code service rejected the request
    #[error("Remote service error (status {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font parse error: {0}")]
    FontParse(String),

    /// QR symbol could not hold the content
    #[error("QR code error: {0}")]
    QrCode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid engine or server configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PosterError {
    /// True when the failure was caused by the request itself rather than
    /// by a collaborator or the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PosterError::Validation(_)
                | PosterError::InvalidColor(_)
                | PosterError::UnsupportedImageType(_)
                | PosterError::Decode(_)
                | PosterError::FontNotFound(_)
                | PosterError::QrCode(_)
        )
    }

    /// True when a remote collaborator (image host or code service) failed.
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, PosterError::Fetch(_) | PosterError::Remote { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(PosterError::Validation("x".into()).is_client_error());
        assert!(PosterError::InvalidColor("#12".into()).is_client_error());
        assert!(!PosterError::Fetch("down".into()).is_client_error());
        assert!(
            PosterError::Remote {
                status: 500,
                body: "oops".into()
            }
            .is_upstream_error()
        );
        assert!(!PosterError::Encode("x".into()).is_upstream_error());
    }

    #[test]
    fn test_remote_error_includes_body() {
        let err = PosterError::Remote {
            status: 200,
            body: r#"{"errcode":40001}"#.into(),
        };
        assert!(err.to_string().contains("40001"));
    }
}
