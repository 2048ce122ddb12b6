//! Page template rendering
//!
//! The template is plain HTML with `{{name}}` placeholders:
//!
//! | placeholder             | value                                   |
//! |-------------------------|-----------------------------------------|
//! | `{{input}}`             | text the user submitted                 |
//! | `{{art}}`               | composed banner                         |
//! | `{{glyph_set}}`         | selected glyph set name                 |
//! | `{{glyph_set_options}}` | `<option>` list with the selection kept |
//!
//! Substitution is a single pass, so user text that looks like a
//! placeholder is never expanded.

use crate::{Result, WebError};
use glyphbanner_core::GlyphSetName;
use std::path::{Path, PathBuf};

const ART_KEY: &str = "art";

/// Values shown on one rendered page
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub input: &'a str,
    pub glyph_set: GlyphSetName,
    pub art: &'a str,
}

/// Loaded page template
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    /// Use `source` as the template; it must contain an `art` placeholder
    pub fn parse(source: impl Into<String>, origin: &Path) -> Result<Self> {
        let source = source.into();
        let has_art = segments(&source)
            .any(|segment| matches!(segment, Segment::Placeholder { key: ART_KEY, .. }));
        if !has_art {
            return Err(WebError::Template {
                path: origin.to_path_buf(),
                message: "missing {{art}} placeholder".to_string(),
            });
        }
        Ok(Self { source })
    }

    /// Read the template from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| WebError::Template {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
        Self::parse(source, path)
    }

    /// Render the page for `view`
    pub fn render(&self, view: &PageView<'_>) -> String {
        let mut page = String::with_capacity(self.source.len() + view.art.len() * 2);

        for segment in segments(&self.source) {
            match segment {
                Segment::Text(text) => page.push_str(text),
                Segment::Placeholder { key, raw } => match key {
                    "input" => page.push_str(&escape_html(view.input)),
                    ART_KEY => page.push_str(&escape_html(view.art)),
                    "glyph_set" => page.push_str(view.glyph_set.as_str()),
                    "glyph_set_options" => page.push_str(&glyph_set_options(view.glyph_set)),
                    // Unknown placeholders are left as written
                    _ => page.push_str(raw),
                },
            }
        }

        page
    }
}

/// Piece of a template source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// `raw` is the full `{{ key }}` text, `key` its trimmed name
    Placeholder { key: &'a str, raw: &'a str },
}

/// Split `source` into text and `{{key}}` placeholders
fn segments(source: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = source;
    let mut pending: Option<Segment<'_>> = None;

    std::iter::from_fn(move || {
        if let Some(segment) = pending.take() {
            return Some(segment);
        }
        if rest.is_empty() {
            return None;
        }

        let placeholder = rest.find("{{").and_then(|start| {
            let end = rest[start + 2..].find("}}")? + start + 4;
            Some((start, end))
        });

        match placeholder {
            Some((start, end)) => {
                let raw = &rest[start..end];
                let text = &rest[..start];
                rest = &rest[end..];
                let segment = Segment::Placeholder {
                    key: raw[2..raw.len() - 2].trim(),
                    raw,
                };
                if text.is_empty() {
                    Some(segment)
                } else {
                    pending = Some(segment);
                    Some(Segment::Text(text))
                }
            }
            None => {
                let text = rest;
                rest = "";
                Some(Segment::Text(text))
            }
        }
    })
}

/// `<option>` elements for every glyph set, marking `selected`
fn glyph_set_options(selected: GlyphSetName) -> String {
    GlyphSetName::ALL
        .iter()
        .map(|name| {
            let marker = if *name == selected { " selected" } else { "" };
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                name.as_str(),
                marker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template(source: &str) -> PageTemplate {
        PageTemplate::parse(source, Path::new("test.html")).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_art_placeholder_may_be_padded() {
        assert!(PageTemplate::parse("<pre>{{ art }}</pre>", Path::new("t.html")).is_ok());
        assert!(PageTemplate::parse("<pre>{{art}}</pre>", Path::new("t.html")).is_ok());

        let err = PageTemplate::parse("<pre>{{ input }}</pre>{{", Path::new("t.html")).unwrap_err();
        assert!(matches!(err, WebError::Template { .. }));
    }

    #[test]
    fn test_segments() {
        let parts: Vec<_> = segments("a{{ x }}{{y}}b{{").collect();
        assert_eq!(
            parts,
            vec![
                Segment::Text("a"),
                Segment::Placeholder { key: "x", raw: "{{ x }}" },
                Segment::Placeholder { key: "y", raw: "{{y}}" },
                Segment::Text("b{{"),
            ]
        );
    }

    #[test]
    fn test_render_placeholders() {
        let page = template("<input value=\"{{input}}\"><pre>{{ art }}</pre>{{glyph_set}}").render(
            &PageView {
                input: "a<b",
                glyph_set: GlyphSetName::Shadow,
                art: "##\n",
            },
        );
        assert_eq!(page, "<input value=\"a&lt;b\"><pre>##\n</pre>shadow");
    }

    #[test]
    fn test_selected_option_is_kept() {
        let page = template("{{glyph_set_options}}{{art}}").render(&PageView {
            input: "",
            glyph_set: GlyphSetName::Thinkertoy,
            art: "",
        });
        assert_eq!(
            page,
            "<option value=\"standard\">standard</option>\n\
             <option value=\"shadow\">shadow</option>\n\
             <option value=\"thinkertoy\" selected>thinkertoy</option>"
        );
    }

    #[test]
    fn test_user_text_is_not_expanded() {
        let page = template("[{{input}}] [{{art}}]").render(&PageView {
            input: "{{art}}",
            glyph_set: GlyphSetName::Standard,
            art: "ART",
        });
        assert_eq!(page, "[{{art}}] [ART]");
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders() {
        let page = template("{{art}} {{title}} {{oops").render(&PageView {
            input: "",
            glyph_set: GlyphSetName::Standard,
            art: "x",
        });
        assert_eq!(page, "x {{title}} {{oops");
    }

    #[test]
    fn test_template_requires_art() {
        let err = PageTemplate::parse("<html></html>", Path::new("index.html")).unwrap_err();
        assert!(matches!(err, WebError::Template { .. }));
    }

    #[test]
    fn test_load_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PageTemplate::load(dir.path().join("index.html")).is_err());
    }

    #[test]
    fn test_bundled_template() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static/index.html");
        let page = PageTemplate::load(path).unwrap().render(&PageView {
            input: "Hi",
            glyph_set: GlyphSetName::Shadow,
            art: "ART",
        });
        assert!(page.contains("ART"));
        assert!(page.contains("<option value=\"shadow\" selected>"));
    }
}
