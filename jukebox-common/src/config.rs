//! Configuration loading and config file resolution
//!
//! Config file path resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/jukebox/config.toml`)
//! 4. Built-in defaults (no file)
//!
//! A missing file never prevents startup; a malformed file does.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "JUKEBOX_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a built-in default so an empty file is valid.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub resolver: ResolverConfig,
    pub queue: QueueConfig,
    pub console: ConsoleConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// External media resolver configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Use the external resolver for problematic hosts
    pub enabled: bool,
    /// Program and leading arguments used to invoke the resolver
    pub program: Vec<String>,
    /// Upper bound on a single resolver invocation
    pub timeout_secs: u64,
    /// Hosts routed through the resolver instead of the generic loader
    pub hosts: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: vec!["python".to_string(), "-m".to_string(), "yt_dlp".to_string()],
            timeout_secs: 30,
            hosts: vec!["youtube.com".to_string(), "youtu.be".to_string()],
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Queue display configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Upcoming titles listed by the queue command
    pub display_limit: usize,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            display_limit: 10,
            event_capacity: 100,
        }
    }
}

/// Identity and simulation settings for the console runtime
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub user_name: String,
    /// Voice channel the console user sits in; empty means not connected
    pub voice_channel: String,
    /// Simulated track length when the loader reports no duration
    pub fallback_track_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_name: "console".to_string(),
            voice_channel: "console-voice".to_string(),
            fallback_track_secs: 180,
        }
    }
}

impl ConsoleConfig {
    pub fn voice_channel(&self) -> Option<&str> {
        let trimmed = self.voice_channel.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Resolve which config file to read, following the priority order above.
///
/// Returns `None` when no candidate exists (defaults apply).
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

/// Parse a TOML config from a string
pub fn parse_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
}

impl TomlConfig {
    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.resolver.enabled && self.resolver.program.iter().all(|arg| arg.trim().is_empty()) {
            return Err(Error::InvalidInput(
                "resolver.program is empty but the resolver is enabled".to_string(),
            ));
        }
        if self.queue.display_limit == 0 {
            return Err(Error::InvalidInput(
                "queue.display_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration with graceful degradation.
///
/// - `None` path: built-in defaults
/// - Path that does not exist: warning + built-in defaults
/// - Path that exists but fails to parse: `Error::Config`
/// - Parsed values that fail [`TomlConfig::validate`]: `Error::InvalidInput`
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using built-in defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
