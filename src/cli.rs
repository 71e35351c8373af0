//! Command-line interface for remote_tictactoe.

use clap::{Parser, Subcommand};

/// Remote Tic-Tac-Toe - client for a bit-packed WebSocket match server
#[derive(Parser, Debug)]
#[command(name = "remote_tictactoe")]
#[command(about = "Client for remote tic-tac-toe matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a server and log every game update
    Watch {
        /// Path to client config file
        #[arg(short, long, default_value = "tictactoe.toml")]
        config: std::path::PathBuf,

        /// Server URL (overrides config and environment)
        #[arg(long)]
        server_url: Option<String>,

        /// Game code to join once connected
        #[arg(long)]
        code: Option<String>,
    },

    /// Decode one server frame given as hex
    Decode {
        /// Frame bytes, e.g. "9f3e96"
        #[arg(long)]
        hex: String,
    },
}
