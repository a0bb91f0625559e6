//! Concrete readers feeding the homescan engine.
//!
//! Every reader implements [`homescan_core::RecordSource`] and maps its own
//! failures (SQLite, I/O, JSON) into [`homescan_core::SourceError`]:
//!
//! - [`snapshot`]: recorder database (`home-assistant_v2.db`), both state
//!   table layouts plus the device table.
//! - [`registry`]: `.storage/core.area_registry` and
//!   `.storage/core.device_registry`.
//! - [`automation`]: automation, script and configuration YAML text.
//! - [`inventory`]: `lsblk` / `smartctl` storage inventory under a timeout.
//! - [`yaml`]: configuration validation with the platform's custom tags.

pub mod automation;
pub mod inventory;
pub mod registry;
pub mod snapshot;
pub mod yaml;

pub use automation::{AutomationFiles, DEFAULT_AUTOMATION_FILES};
pub use inventory::{InventoryOptions, LsblkFile, collect_inventory, parse_lsblk, parse_smartctl};
pub use registry::{AreaRegistry, DeviceRegistry, parse_area_registry, parse_device_registry};
pub use snapshot::{DEFAULT_DATABASE, DeviceTable, SnapshotDatabase, SnapshotSchema, StateSnapshot};
pub use yaml::{Directive, FileReport, FileStatus, validate_file};
