//! TOML-based configuration for bqframe.
//!
//! Supports a config file (bqframe.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connection]
//! driver = "bigquery"
//! connection_string = "${BQFRAME_PROJECT}"
//!
//! [worker]
//! path = "./bqframe-worker"
//! timeout_secs = 60
//! args = ["--location=EU"]
//!
//! [compile]
//! dialect = "bigquery"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;
use crate::worker::DEFAULT_TIMEOUT_SECS;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BQFRAME_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Warehouse connection handed to the worker.
    pub connection: ConnectionSettings,

    /// Worker process configuration.
    pub worker: WorkerSettings,

    /// Compilation options.
    pub compile: CompileSettings,
}

/// Warehouse connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Driver name understood by the worker (bigquery, duckdb, ...).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            driver: "bigquery".to_string(),
            connection_string: String::new(),
        }
    }
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Extra command-line arguments for the worker.
    pub args: Vec<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            args: Vec::new(),
        }
    }
}

/// Compilation configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Dialect used to quote CTE names and table references.
    pub dialect: Dialect,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `BQFRAME_CONFIG`
    /// 2. `./bqframe.toml`
    /// 3. `<config dir>/bqframe/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            tracing::debug!(path = %path, "loading settings from {}", CONFIG_ENV_VAR);
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("bqframe.toml");
        if local_config.exists() {
            tracing::debug!(path = %local_config.display(), "loading local settings");
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("bqframe").join("config.toml");
            if user_config.exists() {
                tracing::debug!(path = %user_config.display(), "loading user settings");
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get the worker binary path.
    ///
    /// Uses the configured path when set, otherwise looks for `bqframe-worker`
    /// in the working directory and on `PATH`.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let local = PathBuf::from("./bqframe-worker");
        if local.exists() {
            return Some(local);
        }

        env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join("bqframe-worker"))
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as-is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            let name = chars.by_ref().take_while(|&ch| ch != '}').collect();
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
