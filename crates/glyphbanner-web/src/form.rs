//! Banner form decoding
//!
//! The page posts `application/x-www-form-urlencoded` bodies with three
//! fields: `textToPrint`, `font` and `genOrDown`. Anything else is rejected
//! before a banner is composed.
//!
//! Decoding follows the browser form rules: a stray `%` is kept literally
//! and invalid UTF-8 becomes U+FFFD.

use crate::{Result, WebError};
use glyphbanner_core::GlyphSetName;
use url::form_urlencoded;

/// Field carrying the text to render
pub const FIELD_TEXT: &str = "textToPrint";
/// Field carrying the glyph set selector
pub const FIELD_GLYPH_SET: &str = "font";
/// Field carrying the requested action
pub const FIELD_ACTION: &str = "genOrDown";

/// What to do with the composed banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerAction {
    /// Show the banner on the page
    #[default]
    Generate,
    /// Send the banner as a file attachment
    Download,
}

impl BannerAction {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "generate" => Ok(BannerAction::Generate),
            "download" => Ok(BannerAction::Download),
            other => Err(WebError::UnknownAction(other.to_string())),
        }
    }
}

/// One banner request, decoded from a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerRequest {
    pub input: String,
    pub glyph_set: GlyphSetName,
    pub action: BannerAction,
}

impl BannerRequest {
    /// Decode a form body
    ///
    /// Missing fields fall back to empty input, `default_glyph_set` and
    /// [`BannerAction::Generate`]. When a field repeats, its first value wins.
    pub fn from_form(body: &[u8], default_glyph_set: GlyphSetName) -> Result<Self> {
        let mut input = None;
        let mut glyph_set = None;
        let mut action = None;

        for (key, value) in form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                FIELD_TEXT => &mut input,
                FIELD_GLYPH_SET => &mut glyph_set,
                FIELD_ACTION => &mut action,
                _ => return Err(WebError::UnknownField(key.into_owned())),
            };
            slot.get_or_insert(value.into_owned());
        }

        let glyph_set = match glyph_set {
            Some(selector) => selector.parse::<GlyphSetName>()?,
            None => default_glyph_set,
        };
        let action = match action {
            Some(value) => BannerAction::parse(&value)?,
            None => BannerAction::default(),
        };

        Ok(Self {
            input: input.unwrap_or_default(),
            glyph_set,
            action,
        })
    }
}
