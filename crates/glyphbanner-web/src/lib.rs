//! # Glyphbanner Web
//!
//! A single-page web form for composing banners:
//! - Preview the banner on the page
//! - Download it as a text file
//! - Serve the page's static assets
//!
//! HTTP handling is minimal: one request per connection, bodies
//! read by `Content-Length`, no keep-alive.

pub mod app;
pub mod error;
pub mod form;
pub mod http;
pub mod page;
pub mod server;

pub use app::App;
pub use error::{Result, WebError};
pub use form::{BannerAction, BannerRequest};
pub use http::{Method, Request, Response, StatusCode};
pub use page::{PageTemplate, PageView};
pub use server::{run, serve};
