//! Banner composition
//!
//! Input text is split on the literal two-character token `\n` (backslash,
//! `n`), and every resulting sub-line becomes one 8-row block of output.
//! Within a block, row `i` is the concatenation of row `i` of every printable
//! character's glyph. Characters outside ASCII 32..=126 are dropped.

use crate::glyph_set::{GlyphSet, GlyphTables, GLYPH_HEIGHT};
use crate::Result;

/// Literal token separating sub-lines in the input (not a newline character)
pub const LINE_BREAK_TOKEN: &str = "\\n";

/// Compose `input` into banner art using `glyphs`
pub fn compose(input: &str, glyphs: &GlyphSet) -> String {
    let mut banner = String::new();

    for sub_line in input.split(LINE_BREAK_TOKEN) {
        for row in 0..GLYPH_HEIGHT {
            for ch in sub_line.chars() {
                if let Some(glyph_row) = glyphs.glyph_row(ch, row) {
                    banner.push_str(glyph_row);
                }
            }
            banner.push('\n');
        }
    }

    banner
}

impl GlyphTables {
    /// Compose `input` with the glyph set named by `selector`
    ///
    /// Unknown selectors are rejected before any composition happens.
    pub fn compose(&self, input: &str, selector: &str) -> Result<String> {
        let glyphs = self.lookup(selector)?;
        Ok(compose(input, glyphs))
    }
}
