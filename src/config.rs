//! Client configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ClientConfig::server_url`].
pub const SERVER_URL_ENV: &str = "TICTACTOE_SERVER_URL";

/// Configuration for the remote tic-tac-toe client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the match server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Game code to join once the server has welcomed us.
    #[serde(default)]
    game_code: Option<String>,
}

#[instrument]
fn default_server_url() -> String {
    "ws://127.0.0.1:80".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            game_code: None,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `server_url` without a game code.
    #[instrument(skip(server_url), fields(server_url = %server_url.as_ref()))]
    pub fn new(server_url: impl AsRef<str>) -> Self {
        Self {
            server_url: server_url.as_ref().to_string(),
            game_code: None,
        }
    }

    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Applies `TICTACTOE_SERVER_URL` from the environment, if set.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(%url, "Server URL taken from environment");
                self.with_server_url(url)
            }
            _ => self,
        }
    }

    /// Replaces the server URL.
    pub fn with_server_url(self, server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..self
        }
    }

    /// Replaces the game code to join.
    pub fn with_game_code(self, game_code: Option<String>) -> Self {
        Self { game_code, ..self }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
