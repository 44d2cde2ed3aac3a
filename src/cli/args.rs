//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Partial page update coordinator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: partial.toml)
    #[arg(short = 'C', long, default_value = "partial.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one interaction against a page fixture and print the ajax response
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Print the full page for a fixture
    #[command(visible_alias = "p")]
    Page {
        /// Page fixture (default: `[serve] fixture`)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        fixture: Option<PathBuf>,
    },

    /// Serve a fixture page with an ajax endpoint
    #[command(visible_alias = "s")]
    Serve {
        /// Page fixture (default: `[serve] fixture`)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        fixture: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Render command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Page fixture (default: `[serve] fixture`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub fixture: Option<PathBuf>,

    /// Markup id of the node the interaction started at (default: page root)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Markup ids of the regions to refresh (comma-separated or repeated)
    #[arg(short, long, value_delimiter = ',')]
    pub refresh: Vec<String>,

    /// Answer with a redirect instead
    #[arg(long, value_hint = clap::ValueHint::Url)]
    pub redirect: Option<String>,

    /// Script evaluated before regions are replaced (repeatable)
    #[arg(long)]
    pub prepend: Vec<String>,

    /// Script evaluated after regions are replaced (repeatable)
    #[arg(long)]
    pub append: Vec<String>,

    /// Print the bare envelope as pretty JSON instead of the framed response
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.verbose {
            config.log.verbose = true;
        }

        match &self.command {
            Commands::Render { args } => {
                if let Some(fixture) = &args.fixture {
                    config.serve.fixture = fixture.clone();
                }
            }
            Commands::Page { fixture } => {
                if let Some(fixture) = fixture {
                    config.serve.fixture = fixture.clone();
                }
            }
            Commands::Serve {
                fixture,
                interface,
                port,
            } => {
                if let Some(fixture) = fixture {
                    config.serve.fixture = fixture.clone();
                }
                if let Some(interface) = interface {
                    config.serve.interface = *interface;
                }
                if let Some(port) = port {
                    config.serve.port = *port;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args() {
        let cli = Cli::parse_from([
            "partial", "render", "--fixture", "inbox.toml", "-r", "count,messages", "--append",
            "done();",
        ]);
        let Commands::Render { args } = &cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.refresh, ["count", "messages"]);
        assert_eq!(args.append, ["done();"]);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.serve.fixture, PathBuf::from("inbox.toml"));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["partial", "-v", "serve", "--port", "9000"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.serve.port, 9000);
        assert!(config.log.verbose);
    }
}
