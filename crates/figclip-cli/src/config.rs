//! TOML configuration for the `figclip` tool.
//!
//! Resolution order for the config file:
//! 1. `--config <path>` or the `FIGCLIP_CONFIG` environment variable
//! 2. the platform config directory:
//!    - Windows: `%APPDATA%\figclip\config.toml`
//!    - Linux:   `$XDG_CONFIG_HOME/figclip/config.toml` or `~/.config/figclip/config.toml`
//!    - macOS:   `~/Library/Application Support/figclip/config.toml`
//! 3. built-in defaults
//!
//! Example:
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [compression]
//! level = 9
//!
//! [archive]
//! version = 15
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use figclip_core::compression::DEFAULT_LEVEL;
use figclip_core::FIG_KIWI_VERSION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"figclip_core=trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompressionConfig {
    /// Raw deflate level for `pack`, 0 (store) to 9 (best).
    #[serde(default = "default_compression_level")]
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveConfig {
    /// Version number written into packed archives.
    #[serde(default = "default_archive_version")]
    pub version: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_compression_level() -> u32 {
    DEFAULT_LEVEL
}
fn default_archive_version() -> u32 {
    FIG_KIWI_VERSION
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: default_compression_level(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            version: default_archive_version(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.compression.level > 9 {
            return Err(ConfigError::Invalid {
                field: "compression.level",
                reason: format!("{} is not in 0..=9", self.compression.level),
            });
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the config from `explicit` if given, else from the platform config
/// file if it exists, else returns defaults.
///
/// # Errors
///
/// An explicitly named file that cannot be read is [`ConfigError::Io`]. A
/// missing platform file is not an error.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return AppConfig::from_toml(&content);
    }

    let Some(path) = default_config_path() else {
        return Ok(AppConfig::default());
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => AppConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Platform location of `config.toml`, if a base directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join("figclip").join("config.toml"))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
