//! Shared configuration for the homescan CLI.
//!
//! A TOML file at the platform config path, layered over built-in defaults
//! and under `HOMESCAN_*` environment variables (`__` separates nested
//! keys, e.g. `HOMESCAN_INVENTORY__TIMEOUT_SECS`). The CLI applies its own
//! flags on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "HOMESCAN_";

/// Accepted values for `defaults.output`.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
/// Accepted values for `defaults.color`.
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Home Assistant configuration directory.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Recorder database, relative to `config_dir` unless absolute.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// How far back to read states from the recorder.
    #[serde(default = "default_lookback")]
    pub state_lookback_hours: u32,

    /// Files scanned for automation references, relative to `config_dir`.
    #[serde(default = "default_automation_files")]
    pub automation_files: Vec<String>,

    #[serde(default)]
    pub inventory: Inventory,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            database: default_database(),
            state_lookback_hours: default_lookback(),
            automation_files: default_automation_files(),
            inventory: Inventory::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Inventory {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound for each `lsblk` / `smartctl` call.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub smartctl: bool,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_timeout(),
            smartctl: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/config")
}
fn default_database() -> PathBuf {
    PathBuf::from("home-assistant_v2.db")
}
fn default_lookback() -> u32 {
    24
}
fn default_automation_files() -> Vec<String> {
    ["automations.yaml", "scripts.yaml", "configuration.yaml"]
        .map(String::from)
        .to_vec()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    10
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// The recorder database path with `config_dir` applied.
    pub fn database_path(&self) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            self.config_dir.join(&self.database)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_lookback_hours == 0 {
            return Err(invalid("state_lookback_hours", "must be at least 1"));
        }
        if self.inventory.timeout_secs == 0 {
            return Err(invalid("inventory.timeout_secs", "must be at least 1"));
        }
        if !OUTPUT_FORMATS.contains(&self.defaults.output.as_str()) {
            return Err(invalid(
                "defaults.output",
                format!("expected one of {}", OUTPUT_FORMATS.join(", ")),
            ));
        }
        if !COLOR_MODES.contains(&self.defaults.color.as_str()) {
            return Err(invalid(
                "defaults.color",
                format!("expected one of {}", COLOR_MODES.join(", ")),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "homescan", "homescan").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homescan");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if it exists), then the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}
