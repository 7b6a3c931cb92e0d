//! Configuration module for bqframe.
//!
//! Handles the settings file, environment variable expansion, and defaults.

mod settings;

pub use settings::{
    expand_env_vars, CompileSettings, ConnectionSettings, Settings, SettingsError,
    WorkerSettings, CONFIG_ENV_VAR,
};
