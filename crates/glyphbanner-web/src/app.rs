//! Request routing
//!
//! ```text
//! GET  /                 page with the welcome banner
//! POST /                 compose from the form, show or download
//! GET  /static/<file>    files from the static directory
//! *    anything else     404 / 405
//! ```

use crate::form::{BannerAction, BannerRequest};
use crate::http::{Method, Request, Response, StatusCode};
use crate::page::{PageTemplate, PageView};
use crate::{Result, WebError};
use anyhow::Context;
use glyphbanner_config::{Config, PageConfig};
use glyphbanner_core::{compose, GlyphTables};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

const STATIC_PREFIX: &str = "/static/";

/// Shared, read-only application state
pub struct App {
    tables: GlyphTables,
    template: PageTemplate,
    page: PageConfig,
    static_dir: PathBuf,
    max_body_bytes: usize,
    read_timeout: Duration,
}

impl App {
    pub fn new(tables: GlyphTables, template: PageTemplate, config: &Config) -> Self {
        Self {
            tables,
            template,
            page: config.page.clone(),
            static_dir: config.assets.static_dir.clone(),
            max_body_bytes: config.server.max_body_bytes,
            read_timeout: Duration::from_secs(config.server.read_timeout_secs),
        }
    }

    /// Load glyph sets and the page template named by `config`
    ///
    /// Fails if any glyph set or the template is missing; the server must not
    /// start without them.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let tables = GlyphTables::load(&config.assets.glyph_dir).with_context(|| {
            format!(
                "Failed to load glyph sets from {}",
                config.assets.glyph_dir.display()
            )
        })?;
        let template = PageTemplate::load(config.assets.template_path())
            .context("Failed to load page template")?;
        tracing::info!(
            "Loaded page template {}",
            config.assets.template_path().display()
        );

        Ok(Self::new(tables, template, config))
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Deadline for reading one complete request
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Route a request to its handler
    pub async fn handle(&self, request: &Request) -> Response {
        let path = request.path();

        if path == "/" {
            return match request.method {
                Method::Get => self.index(),
                Method::Post => self
                    .submit(&request.body)
                    .unwrap_or_else(|e| error_response(&e)),
                _ => method_not_allowed("GET, POST"),
            };
        }

        if let Some(file) = path.strip_prefix(STATIC_PREFIX) {
            return match request.method {
                Method::Get => self.static_file(file).await,
                _ => method_not_allowed("GET"),
            };
        }

        not_found()
    }

    /// First visit: welcome banner in the default glyph set
    fn index(&self) -> Response {
        let glyph_set = self.page.default_glyph_set;
        let art = compose(&self.page.welcome_message, self.tables.get(glyph_set));
        Response::html(self.template.render(&PageView {
            input: "",
            glyph_set,
            art: &art,
        }))
    }

    /// Form submission
    fn submit(&self, body: &[u8]) -> Result<Response> {
        let request = BannerRequest::from_form(body, self.page.default_glyph_set)?;
        tracing::debug!(
            "Composing {} chars with '{}' ({:?})",
            request.input.chars().count(),
            request.glyph_set,
            request.action
        );

        let art = compose(&request.input, self.tables.get(request.glyph_set));

        let response = match request.action {
            BannerAction::Generate => Response::html(self.template.render(&PageView {
                input: &request.input,
                glyph_set: request.glyph_set,
                art: &art,
            })),
            BannerAction::Download => Response::new(StatusCode::OK)
                .with_header(
                    "Content-Disposition",
                    format!("attachment; filename={}", self.page.download_filename),
                )
                .with_header("Content-Type", "text/plain")
                .with_body(art),
        };
        Ok(response)
    }

    async fn static_file(&self, relative: &str) -> Response {
        let Some(path) = safe_join(&self.static_dir, relative) else {
            return not_found();
        };

        match tokio::fs::read(&path).await {
            Ok(contents) => Response::new(StatusCode::OK)
                .with_header("Content-Type", content_type(&path))
                .with_body(contents),
            Err(e) => {
                tracing::debug!("Static file {} unavailable: {}", path.display(), e);
                not_found()
            }
        }
    }
}

/// Join `relative` under `root`, refusing anything that could escape it
fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut components = relative.components().peekable();
    components.peek()?;
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Some(root.join(relative))
    } else {
        None
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Response {
    Response::error(StatusCode::NOT_FOUND, "PAGE NOT FOUND")
}

fn method_not_allowed(allow: &str) -> Response {
    Response::error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").with_header("Allow", allow)
}

/// Map a request error to the response the client sees
pub fn error_response(error: &WebError) -> Response {
    let status = error.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", error);
        Response::error(status, "Internal Server Error")
    } else {
        tracing::warn!("Rejected request: {}", error);
        Response::error(status, status.reason())
    }
}
