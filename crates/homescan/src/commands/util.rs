//! Shared helpers for command handlers.

use homescan_core::{ScanOutcome, run_scan};

use crate::config::Context;
use crate::error::CliError;

/// Run the full scan pipeline over the configured sources.
pub fn scan(ctx: &Context) -> Result<ScanOutcome, CliError> {
    tracing::info!(config_dir = %ctx.config_dir().display(), "starting scan");
    let outcome = run_scan(ctx.scan_inputs())?;
    tracing::info!(
        areas = outcome.statistics.totals.areas,
        devices = outcome.statistics.totals.devices,
        entities = outcome.statistics.totals.entities,
        issues = outcome.issues.len(),
        "scan complete"
    );
    Ok(outcome)
}

/// Point at `homescan scan` when a listing hides data issues.
pub fn note_issues(ctx: &Context, outcome: &ScanOutcome) {
    if ctx.quiet || outcome.issues.is_empty() {
        return;
    }
    let note = format!(
        "{} data issue(s) found; run `homescan scan` for details",
        outcome.issues.len()
    );
    eprintln!("{}", ctx.painter.warn(&note));
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// `-` for empty optional cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}
