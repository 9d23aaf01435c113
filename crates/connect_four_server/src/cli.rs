//! Command-line interface for connect_four_server.

use clap::{Parser, Subcommand};

/// Connect Four session server - play against an automated opponent
#[derive(Parser, Debug)]
#[command(name = "connect_four_server")]
#[command(about = "Connect Four against an automated opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Http {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Play a game in this terminal
    Play,
}
