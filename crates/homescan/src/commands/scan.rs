//! `homescan scan`: summary, area map and issues.

use std::fmt::Write;

use tabled::Tabled;

use homescan_core::{Graph, ScanOutcome, SourceSummary};

use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Source")]
    tag: String,
    #[tabled(rename = "Location")]
    label: String,
    #[tabled(rename = "Inserted")]
    inserted: String,
    #[tabled(rename = "Merged")]
    merged: String,
    #[tabled(rename = "Skipped")]
    skipped: String,
}

impl From<&SourceSummary> for SourceRow {
    fn from(s: &SourceSummary) -> Self {
        let cell = |f: fn(&homescan_core::IngestReport) -> usize| {
            s.report.as_ref().map_or_else(|| "-".to_owned(), |r| f(r).to_string())
        };
        Self {
            tag: s.tag.to_string(),
            label: s.label.clone(),
            inserted: cell(|r| r.inserted),
            merged: cell(|r| r.merged),
            skipped: cell(|r| r.skipped),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn area_map(graph: &Graph, painter: Painter, out: &mut String) {
    for area in graph.areas() {
        let _ = writeln!(
            out,
            "  {} {}",
            painter.heading(&area.name),
            painter.dim(&format!("({})", area.id))
        );
        let devices = graph.devices_in_area(area.id.as_str());
        if devices.is_empty() {
            let _ = writeln!(out, "    {}", painter.dim("no devices"));
        }
        for device in devices {
            let entities = device.entities.len();
            let _ = writeln!(out, "    {} [{}]: {entities} entities", device.display_name(), device.id);
        }
    }

    // Dangling references are highlighted.
    let listed = [
        ("Unassigned devices", graph.unassigned_devices().len(), false),
        ("Orphaned devices", graph.orphan_devices().len(), true),
        ("Standalone entities", graph.standalone_entities().len(), false),
        ("Orphaned entities", graph.orphan_entities().len(), true),
    ];
    for (label, count, highlight) in listed {
        let count = if highlight && count > 0 {
            painter.warn(&count.to_string())
        } else {
            count.to_string()
        };
        let _ = writeln!(out, "  {label}: {count}");
    }
}

fn detail(outcome: &ScanOutcome, ctx: &Context) -> String {
    let painter = ctx.painter;
    let totals = outcome.statistics.totals;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} at {}",
        painter.heading("Scan of"),
        ctx.config_dir().display(),
        outcome.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Areas: {}  Devices: {}  Entities: {}\n",
        totals.areas, totals.devices, totals.entities
    );

    let _ = writeln!(out, "{}", painter.heading("Sources"));
    let rows: Vec<SourceRow> = outcome.sources.iter().map(SourceRow::from).collect();
    let _ = writeln!(out, "{}\n", output::render_table(&rows));

    let _ = writeln!(out, "{}", painter.heading("Area map"));
    area_map(&outcome.graph, painter, &mut out);

    let automation = &outcome.statistics.automation;
    let _ = writeln!(
        out,
        "\n{} {} referenced, {} not referenced, {} unmatched",
        painter.heading("Automations:"),
        automation.referenced.len(),
        automation.unreferenced_count,
        automation.unmatched.len()
    );

    if outcome.issues.is_empty() {
        let _ = write!(out, "\n{}", painter.good("No issues found"));
    } else {
        let _ = writeln!(
            out,
            "\n{}",
            painter.heading(&format!("Issues ({})", outcome.issues.len()))
        );
        for issue in &outcome.issues {
            let _ = writeln!(out, "  {}", painter.warn(&issue.to_string()));
        }
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let outcome = util::scan(ctx)?;
    let out = output::render_report(
        ctx.output,
        &outcome,
        |o| detail(o, ctx),
        |o| o.issues.iter().map(ToString::to_string).collect(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
