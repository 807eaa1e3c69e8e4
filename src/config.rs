//! Configuration management for the idl-codec CLI
//!
//! Config is stored at ~/.config/idl-codec/config.toml

use crate::error::{IdlCodecError, IdlCodecResult};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default log filter when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Config directory name
const CONFIG_DIR: &str = "idl-codec";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// idl-codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log filter passed to env_logger, e.g. `info` or `idl_codec=debug,warn`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Colour terminal output
    #[serde(default = "default_color")]
    pub color: bool,

    /// IDL file used when `--idl` is not given
    #[serde(default)]
    pub default_idl: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            color: default_color(),
            default_idl: None,
        }
    }
}

impl Config {
    /// Get the config directory path (~/.config/idl-codec/)
    pub fn dir_path() -> IdlCodecResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR))
            .ok_or_else(|| IdlCodecError::Config("Could not determine config directory".into()))
    }

    /// Get the config file path (~/.config/idl-codec/config.toml)
    pub fn file_path() -> IdlCodecResult<PathBuf> {
        Self::dir_path().map(|p| p.join(CONFIG_FILE))
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::file_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load config from the default location, returning defaults if absent
    pub fn load() -> IdlCodecResult<Self> {
        Self::load_from(Self::file_path()?)
    }

    /// Load config from `path`, returning defaults if the file doesn't exist
    pub fn load_from(path: impl AsRef<Path>) -> IdlCodecResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&contents)
            .map_err(|e| IdlCodecError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> IdlCodecResult<()> {
        self.save_to(Self::file_path()?)
    }

    /// Save config to `path`, creating directories if needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> IdlCodecResult<()> {
        let path = path.as_ref();

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| IdlCodecError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents)?;

        Ok(())
    }

    /// Validate the config values
    pub fn validate(&self) -> IdlCodecResult<()> {
        validate_log_filter(&self.log_level)?;

        if let Some(path) = &self.default_idl {
            if path.as_os_str().is_empty() {
                return Err(IdlCodecError::Config("default_idl must not be empty".into()));
            }
        }

        Ok(())
    }
}

/// Accept env_logger directives of the form `level` or `module=level`,
/// comma separated, with an optional `/regex` suffix. A bare module name is
/// refused since it cannot be told apart from a misspelt level.
fn validate_log_filter(filter: &str) -> IdlCodecResult<()> {
    let directives = filter.split_once('/').map_or(filter, |(d, _)| d);
    let invalid = |directive: &str| {
        IdlCodecError::Config(format!(
            "log_level directive `{}` must be a level (off, error, warn, info, debug, trace) or module=level",
            directive
        ))
    };

    let mut seen = false;
    for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let level = match directive.split_once('=') {
            Some((module, level)) if !module.trim().is_empty() => level.trim(),
            Some(_) => return Err(invalid(directive)),
            None => directive,
        };
        LevelFilter::from_str(level).map_err(|_| invalid(directive))?;
        seen = true;
    }

    if !seen {
        return Err(IdlCodecError::Config("log_level must not be empty".into()));
    }
    Ok(())
}
