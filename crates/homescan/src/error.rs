//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use homescan_config::ConfigError;
use homescan_core::{CoreError, SourceError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INVALID_CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNAVAILABLE: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Sources ──────────────────────────────────────────────────────

    #[error("{what} not found at {path}")]
    #[diagnostic(
        code(homescan::not_found),
        help(
            "Point homescan at the installation's configuration directory:\n\
             homescan --config-dir /path/to/config <command>"
        )
    )]
    NotFound { what: String, path: String },

    #[error("{what} is unavailable: {reason}")]
    #[diagnostic(code(homescan::unavailable))]
    Unavailable { what: String, reason: String },

    #[error("{what} did not respond within {seconds}s")]
    #[diagnostic(
        code(homescan::timeout),
        help(
            "Raise inventory.timeout_secs in the config file, or capture the output\n\
             on the host and pass it with --from-file"
        )
    )]
    Timeout { what: String, seconds: u64 },

    #[error("Storage inventory collection is disabled")]
    #[diagnostic(
        code(homescan::inventory_disabled),
        help("Set inventory.enabled = true, or pass a saved `lsblk -J` document with --from-file")
    )]
    InventoryDisabled,

    // ── Validation ───────────────────────────────────────────────────

    #[error("{failed} of {total} configuration file(s) failed validation")]
    #[diagnostic(code(homescan::invalid_yaml))]
    InvalidYaml { failed: usize, total: usize },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homescan::validation))]
    Validation { field: String, reason: String },

    // ── Engine ───────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(homescan::internal))]
    Core(#[from] CoreError),

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(homescan::config),
        help("Check the config file with: homescan config show")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Overwriting '{path}' requires confirmation")]
    #[diagnostic(
        code(homescan::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(homescan::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unavailable { .. } | Self::InventoryDisabled => exit_code::UNAVAILABLE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::InvalidYaml { .. } | Self::Config(_) => exit_code::INVALID_CONFIG,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Core(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

// ── SourceError → CliError mapping ───────────────────────────────────

impl From<SourceError> for CliError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Missing { what, path } => Self::NotFound { what, path },
            SourceError::Unreadable { what, reason } | SourceError::Format { what, reason } => {
                Self::Unavailable { what, reason }
            }
            SourceError::Timeout { what, timeout_secs } => Self::Timeout {
                what,
                seconds: timeout_secs,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_map_to_exit_codes() {
        let missing: CliError = SourceError::missing("lsblk", "PATH").into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let timeout: CliError = SourceError::Timeout {
            what: "smartctl".into(),
            timeout_secs: 10,
        }
        .into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let format: CliError = SourceError::format("lsblk output", "expected value").into();
        assert_eq!(format.exit_code(), exit_code::UNAVAILABLE);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err: CliError = ConfigError::Validation {
            field: "defaults.output".into(),
            reason: "expected one of table, json".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
