//! # Glyphbanner Core
//!
//! Turns plain text into banner art built from fixed-height glyph sets.
//!
//! This crate provides:
//! - Loading and validating glyph set definitions
//! - Composing input text into multi-row banners
//!
//! ```text
//!    ##   #####   ####
//!   ####  ##  ## ##  ##
//!  ##  ## #####  ##
//!  ###### ##  ## ##  ##
//!  ##  ## #####   ####
//! ```

pub mod composer;
pub mod error;
pub mod glyph_set;

pub use composer::{compose, LINE_BREAK_TOKEN};
pub use error::{CoreError, Result};
pub use glyph_set::{
    GlyphSet, GlyphSetName, GlyphTables, FIRST_PRINTABLE, GLYPH_COUNT, GLYPH_HEIGHT,
    GLYPH_SET_ROWS, LAST_PRINTABLE,
};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
