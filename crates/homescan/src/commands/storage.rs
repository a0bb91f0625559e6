//! `homescan storage`: storage tiering advice.

use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;

use homescan_core::tiering::{
    MigrationStep, Recommendation, SetupAssessment, assess_setup, migration_plan, recommend,
};
use homescan_core::{RecordSource, StorageDevice};
use homescan_sources::{LsblkFile, collect_inventory};

use crate::cli::StorageArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StorageReport {
    devices: Vec<StorageDevice>,
    recommendations: Vec<Recommendation>,
    assessment: SetupAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    migration_plan: Option<&'static [MigrationStep]>,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Mount")]
    mountpoint: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Avoid")]
    avoid: String,
}

fn join<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".into();
    }
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl From<&Recommendation> for RecommendationRow {
    fn from(r: &Recommendation) -> Self {
        Self {
            device: r.device.clone(),
            mountpoint: r.mountpoint.clone(),
            class: r.class.to_string(),
            tier: r.tier.to_string(),
            recommended: join(r.recommended),
            avoid: join(r.avoid),
        }
    }
}

fn detail(report: &StorageReport, painter: Painter) -> String {
    let mut out = String::new();
    let setup = &report.assessment;

    let _ = writeln!(
        out,
        "{} {} device(s)",
        painter.heading("Storage:"),
        setup.total_devices
    );
    for (class, count) in setup.classes.iter().filter(|(_, n)| **n > 0) {
        let _ = writeln!(out, "  {class}: {count}");
    }

    let _ = writeln!(out, "\n{}", painter.heading("Mount points"));
    for (mountpoint, summary) in &setup.mountpoints {
        let size = summary.size.as_deref().unwrap_or("?");
        let _ = writeln!(
            out,
            "  {mountpoint}: {} ({}, {size})",
            summary.device, summary.class
        );
    }

    let _ = writeln!(out, "\n{}", painter.heading("Recommendations"));
    if report.recommendations.is_empty() {
        let _ = writeln!(out, "  {}", painter.dim("no mounted, classifiable devices"));
    } else {
        let rows: Vec<RecommendationRow> = report
            .recommendations
            .iter()
            .map(RecommendationRow::from)
            .collect();
        let _ = writeln!(out, "{}", output::render_table(&rows));
        for r in report.recommendations.iter().filter(|r| !r.current_usage.is_empty()) {
            let _ = writeln!(out, "  {} holds: {}", r.mountpoint, r.current_usage.join(", "));
        }
    }

    for advisory in &setup.advisories {
        let _ = writeln!(out, "{}", painter.warn(&format!("! {advisory}")));
    }

    if let Some(plan) = report.migration_plan {
        let _ = writeln!(out, "\n{}", painter.heading("Migration plan"));
        for step in plan {
            let _ = writeln!(out, "  {}. {}", step.step, step.title);
            for action in step.actions {
                let _ = writeln!(out, "     - {action}");
            }
        }
    }
    out.trim_end().to_owned()
}

// ── Inventory ───────────────────────────────────────────────────────

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Collecting storage inventory...");
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

async fn inventory(ctx: &Context, from_file: Option<&Path>) -> Result<Vec<StorageDevice>, CliError> {
    if let Some(path) = from_file {
        return Ok(LsblkFile::new(path).read()?);
    }
    if !ctx.config.inventory.enabled {
        return Err(CliError::InventoryDisabled);
    }
    let bar = spinner(ctx.quiet);
    let result = collect_inventory(&ctx.inventory_options()).await;
    bar.finish_and_clear();
    Ok(result?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: &StorageArgs) -> Result<(), CliError> {
    let devices = inventory(ctx, args.from_file.as_deref()).await?;
    let report = StorageReport {
        recommendations: recommend(&devices),
        assessment: assess_setup(&devices),
        migration_plan: args.plan.then(migration_plan),
        devices,
    };
    let out = output::render_report(
        ctx.output,
        &report,
        |r| detail(r, ctx.painter),
        |r| {
            r.recommendations
                .iter()
                .map(|rec| format!("{} {}", rec.mountpoint, rec.tier))
                .collect()
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
