//! Error types for Glyphbanner Core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Glyphbanner Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A glyph set definition could not be opened or read
    #[error("failed to read glyph set '{name}' from {}: {source}", path.display())]
    GlyphSetIo {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A glyph set definition does not hold one 8-row block per printable character
    #[error("glyph set '{name}' has {found} rows, expected {expected}")]
    GlyphSetSize {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Glyph tables were assembled without one of the known sets
    #[error("glyph set '{0}' was not loaded")]
    MissingGlyphSet(String),

    /// I/O error without a file path attached
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Selector does not name any known glyph set
    #[error("unknown glyph set: {0}")]
    UnknownGlyphSet(String),
}
