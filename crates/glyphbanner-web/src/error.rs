//! Error types for the Glyphbanner web surface

use crate::http::StatusCode;
use glyphbanner_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for web operations
pub type Result<T> = std::result::Result<T, WebError>;

/// Web error types
#[derive(Error, Debug)]
pub enum WebError {
    /// Request line or headers could not be parsed
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Declared body exceeds the configured limit
    #[error("request body of {size} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { size: usize, limit: usize },

    /// Form carries a field this page never sends
    #[error("unknown form field: {0}")]
    UnknownField(String),

    /// Action selector is neither generate nor download
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Page template is missing or unusable
    #[error("template error in {}: {message}", path.display())]
    Template { path: PathBuf, message: String },

    /// Glyph set errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    /// HTTP status reported to the client for this error
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::MalformedRequest(_)
            | WebError::UnknownField(_)
            | WebError::UnknownAction(_)
            | WebError::Core(CoreError::UnknownGlyphSet(_)) => StatusCode::BAD_REQUEST,
            WebError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            WebError::Template { .. } | WebError::Core(_) | WebError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
