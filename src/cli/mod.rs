//! CLI module for Sensei
//!
//! Command-line parsing for the `sensei-server` binary. Flags override the
//! values loaded from the configuration file.

use crate::utils::config::SenseiConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sensei - math tutor server
#[derive(Parser, Debug)]
#[command(
    name = "sensei-server",
    version,
    about = "Sensei - math tutor server",
    long_about = "Answers math questions over HTTP using a language model \
                  with Wolfram Alpha access.\n\n\
                  Run without a subcommand to start the server.",
    after_help = "EXAMPLES:\n    \
                  sensei-server                        # Start with ./sensei.toml (optional)\n    \
                  sensei-server --port 9000            # Override the port\n    \
                  sensei-server config --validate      # Check configuration and credentials"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sensei.toml", global = true)]
    pub config: PathBuf,

    /// Address to bind, overrides server.host
    #[arg(long, env = "SENSEI_HOST", global = true)]
    pub host: Option<String>,

    /// Port to listen on, overrides server.port
    #[arg(long, env = "SENSEI_PORT", global = true)]
    pub port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Print the effective configuration
    Config {
        /// Also check that the credential environment variables are set
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply `--host` / `--port` on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut SenseiConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self, config: &SenseiConfig) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            config.server.log_level.clone()
        }
    }
}
