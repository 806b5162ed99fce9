//! Configuration file handling for `~/.navdat/config.ini`.
//!
//! ```ini
//! [reader]
//! read_whole_file = true
//!
//! [logging]
//! level = info
//! directory = ~/.navdat/logs
//! file = navdat.log
//! ```
//!
//! A missing file yields [`NavdatConfig::default`]. The
//! `NAVDAT_READ_WHOLE_FILE` environment variable overrides
//! `reader.read_whole_file` when [`NavdatConfig::apply_env_overrides`] is
//! called.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding `[reader] read_whole_file`.
pub const READ_WHOLE_FILE_ENV: &str = "NAVDAT_READ_WHOLE_FILE";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "navdat.log";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the config file
    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value is present but not acceptable
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create the config directory
    #[error("Failed to create config directory: {0}")]
    Directory(std::io::Error),
}

/// `[reader]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Parse the whole file in one pass (`true`) or per layer on demand.
    pub read_whole_file: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            read_whole_file: true,
        }
    }
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset: a level (`info`) or any
    /// `RUST_LOG`-style directive list (`navdat=debug,warn`).
    pub level: String,
    /// Directory for the log file. No file logging when `None`.
    pub directory: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            file_name: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Complete navdat configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavdatConfig {
    pub reader: ReaderSettings,
    pub logging: LoggingSettings,
}

impl NavdatConfig {
    /// Load from the default path (`~/.navdat/config.ini`).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Save to the default path, creating `~/.navdat` if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Directory)?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup(READ_WHOLE_FILE_ENV) {
            self.reader.read_whole_file =
                parse_bool(&v).ok_or_else(|| ConfigError::InvalidValue {
                    section: "env".to_string(),
                    key: READ_WHOLE_FILE_ENV.to_string(),
                    value: v.clone(),
                    reason: "expected true/false, yes/no, on/off or 1/0".to_string(),
                })?;
        }
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("reader")).set(
            "read_whole_file",
            if self.reader.read_whole_file { "true" } else { "false" },
        );

        let mut logging = ini.with_section(Some("logging"));
        logging
            .set("level", self.logging.level.as_str())
            .set("file", self.logging.file_name.as_str());
        if let Some(dir) = &self.logging.directory {
            logging.set("directory", dir.to_string_lossy().into_owned());
        }
        ini
    }
}

fn parse_ini(ini: &Ini) -> Result<NavdatConfig, ConfigError> {
    let mut config = NavdatConfig::default();

    if let Some(section) = ini.section(Some("reader")) {
        if let Some(v) = section.get("read_whole_file") {
            config.reader.read_whole_file =
                parse_bool(v).ok_or_else(|| ConfigError::InvalidValue {
                    section: "reader".to_string(),
                    key: "read_whole_file".to_string(),
                    value: v.to_string(),
                    reason: "expected true/false, yes/no, on/off or 1/0".to_string(),
                })?;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("level") {
            let level = v.trim();
            if let Err(e) = EnvFilter::try_new(level) {
                return Err(ConfigError::InvalidValue {
                    section: "logging".to_string(),
                    key: "level".to_string(),
                    value: v.to_string(),
                    reason: format!("not a valid filter directive: {}", e),
                });
            }
            config.logging.level = level.to_string();
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains(&['/', '\\'][..]) {
                return Err(ConfigError::InvalidValue {
                    section: "logging".to_string(),
                    key: "file".to_string(),
                    value: v.to_string(),
                    reason: "must be a plain file name".to_string(),
                });
            }
            config.logging.file_name = v.to_string();
        }
    }

    Ok(config)
}

/// Accepts true/false, yes/no, on/off and 1/0, ignoring case.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Path to the config directory (`~/.navdat`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".navdat")
}

/// Path to the config file (`~/.navdat/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
