//! Glyphbanner - text to banner art, on the command line or in the browser
//!
//! ```text
//!  ####  ##      ##  ##
//! ##     ##      ##  ##
//! ## ### ##       ####    Welcome to Glyphbanner!
//! ##  ## ##        ##
//!  ####  ######    ##
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use glyphbanner_config::Config;
use glyphbanner_core::{compose, GlyphSetName, GlyphTables};
use glyphbanner_web::App;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Glyphbanner - render text as banner art
#[derive(Parser, Debug)]
#[command(name = "glyphbanner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Directory holding the glyph set definitions
    #[arg(long, global = true)]
    glyph_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the banner web form (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short = 'p', long)]
        port: Option<u16>,

        /// Directory served under /static/
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print a banner to stdout
    Render {
        /// Text to render; a literal \n starts a new banner line
        text: String,

        /// Glyph set to use
        #[arg(short = 'g', long)]
        glyph_set: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                format!(
                    "glyphbanner={0},glyphbanner_core={0},glyphbanner_config={0},glyphbanner_web={0}",
                    log_level
                )
            }),
        ))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.glyph_dir {
        config.assets.glyph_dir = dir;
    }

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        static_dir: None,
    }) {
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = static_dir {
                config.assets.static_dir = dir;
            }
            config.validate()?;
            serve(config).await
        }
        Command::Render { text, glyph_set } => render(&config, &text, glyph_set.as_deref()),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Glyphbanner v{}", env!("CARGO_PKG_VERSION"));

    // Everything must load before the listener is bound
    let app = Arc::new(App::from_config(&config)?);
    let address = config.bind_address()?;

    glyphbanner_web::run(address, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

fn render(config: &Config, text: &str, glyph_set: Option<&str>) -> anyhow::Result<()> {
    let name = match glyph_set {
        Some(selector) => selector.parse::<GlyphSetName>()?,
        None => config.page.default_glyph_set,
    };
    let tables = GlyphTables::load(&config.assets.glyph_dir).with_context(|| {
        format!(
            "Failed to load glyph sets from {}",
            config.assets.glyph_dir.display()
        )
    })?;

    print!("{}", compose(text, tables.get(name)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_parsing() {
        let args = Args::try_parse_from(["glyphbanner"]).unwrap();
        assert!(!args.debug);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_serve_options() {
        let args =
            Args::try_parse_from(["glyphbanner", "serve", "-p", "9000", "--host", "127.0.0.1"])
                .unwrap();
        match args.command {
            Some(Command::Serve { host, port, .. }) => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_options() {
        let args = Args::try_parse_from([
            "glyphbanner",
            "--glyph-dir",
            "/tmp/glyphs",
            "render",
            "Hi\\nthere",
            "-g",
            "shadow",
        ])
        .unwrap();
        assert_eq!(args.glyph_dir, Some(PathBuf::from("/tmp/glyphs")));
        match args.command {
            Some(Command::Render { text, glyph_set }) => {
                assert_eq!(text, "Hi\\nthere");
                assert_eq!(glyph_set.as_deref(), Some("shadow"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_rejects_unknown_glyph_set() {
        let config = Config::default();
        assert!(render(&config, "Hi", Some("gothic")).is_err());
    }
}
