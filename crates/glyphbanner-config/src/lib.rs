//! # Glyphbanner Configuration
//!
//! Configuration sources (in priority order):
//! 1. CLI arguments (applied by the binary)
//! 2. Environment variables (`GLYPHBANNER_SERVER__PORT=9000`)
//! 3. Config file (`--config`, or ~/.config/glyphbanner/config.toml)
//! 4. Built-in defaults

use anyhow::{bail, Context};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use glyphbanner_core::GlyphSetName;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "GLYPHBANNER_";

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "glyphbanner", "Glyphbanner")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config/glyphbanner"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Where glyph sets, the page template and static files live
    pub assets: AssetsConfig,
    /// Page and download behavior
    pub page: PageConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Seconds a client may take to send a complete request
    pub read_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 64 * 1024,
            read_timeout_secs: 30,
        }
    }
}

/// Asset locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served under `/static/`
    pub static_dir: PathBuf,
    /// Directory holding `<glyph set>.txt` definitions
    pub glyph_dir: PathBuf,
    /// Page template file name, relative to `static_dir`
    pub template: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            glyph_dir: PathBuf::from("static"),
            template: PathBuf::from("index.html"),
        }
    }
}

impl AssetsConfig {
    /// Full path of the page template
    pub fn template_path(&self) -> PathBuf {
        self.static_dir.join(&self.template)
    }
}

/// Page and download behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Banner shown on first page load
    pub welcome_message: String,
    /// Glyph set used when the form does not name one
    pub default_glyph_set: GlyphSetName,
    /// Attachment name for downloads
    pub download_filename: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            welcome_message: "* Welcome *".to_string(),
            default_glyph_set: GlyphSetName::Standard,
            download_filename: "ASCII_Art.txt".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, a config file and the environment
    ///
    /// An explicit `path` must exist; without one the user config file is
    /// used if present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = config_dir().join("config.toml");
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(ref path) = path {
            tracing::info!("Loading configuration from {}", path.display());
        }

        let config: Config = Self::figment(path.as_deref())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults layered with an optional TOML file
    fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    /// Load a config file without consulting the environment
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let config: Config = Self::figment(Some(path))
            .extract()
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be non-zero");
        }
        if self.server.read_timeout_secs == 0 {
            bail!("server.read_timeout_secs must be non-zero");
        }

        let filename = &self.page.download_filename;
        if filename.is_empty() {
            bail!("page.download_filename must not be empty");
        }
        // The name is sent verbatim inside a Content-Disposition header
        if filename
            .chars()
            .any(|c| c.is_control() || matches!(c, '"' | '/' | '\\' | ';'))
        {
            bail!("page.download_filename contains invalid characters: {filename:?}");
        }

        Ok(())
    }

    /// Socket address the server should bind
    ///
    /// `server.host` may be an IPv4 or IPv6 literal or a host name; names
    /// are resolved and the first address is used.
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        let host = self.server.host.as_str();
        (host, self.server.port)
            .to_socket_addrs()
            .with_context(|| format!("Invalid bind address: {host}"))?
            .next()
            .with_context(|| format!("Host {host} did not resolve to any address"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
