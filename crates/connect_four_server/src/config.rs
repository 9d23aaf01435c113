//! Server configuration loaded from TOML.

use crate::engine::EngineSettings;
use connect_four::{OpponentStrategy, rules};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Board geometry shared by every session.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Aligned discs needed to win.
    connect: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 6,
            connect: rules::DEFAULT_CONNECT,
        }
    }
}

/// Lock waiting and idle-session eviction.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    /// Longest wait for a busy session, in milliseconds. Absent waits forever.
    lock_timeout_ms: Option<u64>,
    /// Sessions idle this long lose their lock entry. Absent never evicts.
    idle_ttl_secs: Option<u64>,
    /// How often the idle reaper runs.
    reap_interval_secs: u64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            lock_timeout_ms: None,
            idle_ttl_secs: None,
            reap_interval_secs: 60,
        }
    }
}

impl SessionPolicy {
    /// Idle time after which a session's lock is evicted, if enabled.
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }

    /// Interval between idle reaper runs.
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

/// Where sessions are persisted.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. Absent keeps sessions in memory.
    database_path: Option<String>,
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Automated opponent to play against.
    opponent: OpponentStrategy,
    /// Board geometry.
    board: BoardConfig,
    /// Session lock policy.
    sessions: SessionPolicy,
    /// Persistence backend.
    storage: StorageConfig,
}

impl ServerConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or fails
    /// validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            width = config.board.width,
            height = config.board.height,
            opponent = %config.opponent,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid value.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width < 1 {
            return Err(ConfigError::new("board.width must be at least 1"));
        }
        if self.board.height < 1 {
            return Err(ConfigError::new("board.height must be at least 1"));
        }
        if self.board.connect < 1 {
            return Err(ConfigError::new("board.connect must be at least 1"));
        }
        if self.sessions.reap_interval_secs < 1 {
            return Err(ConfigError::new(
                "sessions.reap_interval_secs must be at least 1",
            ));
        }
        Ok(())
    }

    /// Engine settings derived from this configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        let settings = EngineSettings::new(self.board.width, self.board.height, self.board.connect);
        match self.sessions.lock_timeout_ms {
            Some(ms) => settings.with_lock_timeout(Duration::from_millis(ms)),
            None => settings,
        }
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
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
