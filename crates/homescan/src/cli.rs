//! Clap derive structures for the `homescan` CLI.
//!
//! Only depends on clap and clap_complete so the build script can include
//! it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homescan -- reconcile a home-automation installation into one graph
#[derive(Debug, Parser)]
#[command(
    name = "homescan",
    version,
    about = "Map areas, devices and entities of a home-automation installation",
    long_about = "Reads the recorder database, the area and device registries and the\n\
        automation files of a home-automation configuration directory, merges\n\
        them into one area -> device -> entity graph, and reports orphans,\n\
        statistics and storage tiering advice.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration directory of the installation (overrides config file)
    #[arg(long, short = 'C', env = "HOMESCAN_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Recorder database, relative to the configuration directory unless absolute
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Hours of state history to read from the recorder
    #[arg(long, global = true)]
    pub lookback_hours: Option<u32>,

    /// Output format [default: table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full scan: summary, area map and data issues
    Scan,

    /// List areas with their device and entity counts
    Areas,

    /// List devices and where they are placed
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// List entities with their device, area and automation coverage
    #[command(alias = "ent")]
    Entities(EntitiesArgs),

    /// Counts by domain, manufacturer and area
    Stats,

    /// Classify block devices and recommend what to store on each
    Storage(StorageArgs),

    /// Check configuration YAML files, accepting the platform's custom tags
    Validate(ValidateArgs),

    /// Manage the homescan configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES / ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only devices whose area does not exist
    #[arg(long, conflicts_with = "unassigned")]
    pub orphaned: bool,

    /// Only devices without an area
    #[arg(long)]
    pub unassigned: bool,
}

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only entities of this domain (e.g. `light`)
    #[arg(long, short = 'd')]
    pub domain: Option<String>,

    /// Only entities referenced by an automation or script
    #[arg(long)]
    pub referenced: bool,

    /// Only entities whose device does not exist
    #[arg(long)]
    pub orphaned: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STORAGE / VALIDATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Read saved `lsblk -J` output instead of probing this host
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Also print the staged migration plan
    #[arg(long)]
    pub plan: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Files to check (default: configuration.yaml in the configuration directory)
    pub files: Vec<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with the resolved settings
    Init,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
