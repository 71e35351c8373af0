//! Remote Tic-Tac-Toe - command-line client
//!
//! Watches a match on a remote server or decodes captured frames.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use remote_tictactoe::protocol::ServerPacket;
use remote_tictactoe::transport::{Transport, WebSocketTransport};
use remote_tictactoe::{ClientConfig, Notification, Session, SessionPhase};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Watch {
            config,
            server_url,
            code,
        } => run_watch(&config, server_url, code).await,
        Command::Decode { hex } => run_decode(&hex),
    }
}

/// Connects, optionally joins a game, and logs the game after every update.
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_watch(
    config_path: &Path,
    server_url: Option<String>,
    code: Option<String>,
) -> Result<()> {
    let config = load_config(config_path, server_url, code)?;

    // Fail before connecting rather than after the server's welcome.
    let code = config
        .game_code()
        .as_deref()
        .map(Session::validate_game_code)
        .transpose()?;

    let url = config.server_url().clone();
    info!(%url, "Starting session");
    let (session, mut notifications) = Session::connect(move || {
        Box::new(WebSocketTransport::new(&url)) as Box<dyn Transport>
    });

    let mut welcomed = false;
    loop {
        tokio::select! {
            notification = notifications.recv() => {
                let Some(notification) = notification else { break };
                match notification {
                    Notification::Refresh => {
                        let game = session.game();
                        info!(game = %serde_json::to_string(&game)?, "Game updated");
                        if !welcomed {
                            welcomed = true;
                            if let Some(code) = &code {
                                info!(%code, "Joining game");
                                session.submit_game_code(code.as_str())?;
                            }
                        }
                    }
                    Notification::Error(message) => {
                        if !welcomed && session.phase() == SessionPhase::Closed {
                            error!(%message, "Could not connect");
                            bail!(message);
                        }
                        warn!(%message, "Session reported an error");
                        if session.phase() == SessionPhase::Closed {
                            break;
                        }
                    }
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Shutting down");
                session.close_connection().await;
                break;
            }
        }
    }

    Ok(())
}

#[instrument(skip(config_path))]
fn load_config(
    config_path: &Path,
    server_url: Option<String>,
    code: Option<String>,
) -> Result<ClientConfig> {
    let config = if config_path.exists() {
        ClientConfig::from_file(config_path)?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        ClientConfig::default()
    };

    let mut config = config.with_env_overrides();
    if let Some(url) = server_url {
        debug!(%url, "Overriding server URL");
        config = config.with_server_url(url);
    }
    if code.is_some() {
        config = config.with_game_code(code);
    }
    Ok(config)
}

/// Decodes one server frame and prints the packet.
#[instrument]
fn run_decode(hex: &str) -> Result<()> {
    let frame = parse_hex(hex)?;
    let packet = ServerPacket::decode(&frame)
        .with_context(|| format!("Could not decode frame {:02x?}", frame))?;
    println!("{:#?}", packet);
    Ok(())
}

fn parse_hex(hex: &str) -> Result<Vec<u8>> {
    let digits: String = hex
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !digits.is_ascii() {
        bail!("Hex input must only contain the digits 0-9 and a-f");
    }
    if digits.len() % 2 != 0 {
        bail!("Hex input must have an even number of digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}
