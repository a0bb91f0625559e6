//! CLI configuration: the shared `homescan_config` file with flag overrides.
//!
//! Flags win over the environment, the environment over the file, the file
//! over built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use homescan_core::ScanInputs;
use homescan_sources::{AreaRegistry, AutomationFiles, DeviceRegistry, InventoryOptions, SnapshotDatabase};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};

pub use homescan_config::{Config, config_path, load_config_from, save_config_to};

/// Everything a command handler needs, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub output: OutputFormat,
    pub painter: Painter,
    pub quiet: bool,
    pub yes: bool,
}

impl Context {
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let mut config = load_config_from(&config_path())?;
        apply_overrides(&mut config, global);
        config.validate()?;

        let output = match global.output {
            Some(format) => format,
            None => parse_value::<OutputFormat>("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_value::<ColorMode>("defaults.color", &config.defaults.color)?,
        };

        Ok(Self {
            config,
            output,
            painter: Painter::new(output::should_color(color)),
            quiet: global.quiet,
            yes: global.yes,
        })
    }

    /// Configuration directory of the scanned installation.
    pub fn config_dir(&self) -> &std::path::Path {
        &self.config.config_dir
    }

    /// Wire every configured reader into the scan pipeline. The device
    /// table and the registry both feed devices; precedence settles
    /// conflicts regardless of order.
    pub fn scan_inputs(&self) -> ScanInputs {
        let dir = self.config_dir();
        let db = SnapshotDatabase::new(self.config.database_path(), self.config.state_lookback_hours);
        ScanInputs::new()
            .with_areas(AreaRegistry::in_config_dir(dir))
            .with_devices(db.device_table())
            .with_devices(DeviceRegistry::in_config_dir(dir))
            .with_entities(db.states())
            .with_automations(AutomationFiles::new(dir, self.config.automation_files.clone()))
    }

    pub fn inventory_options(&self) -> InventoryOptions {
        InventoryOptions {
            timeout: Duration::from_secs(self.config.inventory.timeout_secs),
            smartctl: self.config.inventory.smartctl,
            ..InventoryOptions::default()
        }
    }
}

fn apply_overrides(config: &mut Config, global: &GlobalOpts) {
    if let Some(ref dir) = global.config_dir {
        config.config_dir.clone_from(dir);
    }
    if let Some(ref db) = global.database {
        config.database.clone_from(db);
    }
    if let Some(hours) = global.lookback_hours {
        config.state_lookback_hours = hours;
    }
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Config as it would be written by `config init`: file values plus the
/// directory flags given on this invocation.
pub fn effective_config(global: &GlobalOpts) -> Result<(PathBuf, Config), CliError> {
    let path = config_path();
    let mut config = load_config_from(&path)?;
    apply_overrides(&mut config, global);
    config.validate()?;
    Ok((path, config))
}
