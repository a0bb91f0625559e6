//! `homescan stats`: grouped counts and relationship reports.

use std::fmt::Write;

use tabled::Tabled;

use homescan_core::{GroupCount, Statistics};

use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Count")]
    count: usize,
}

fn groups(title: &str, counts: &[GroupCount], painter: Painter, out: &mut String) {
    let _ = writeln!(out, "\n{}", painter.heading(title));
    if counts.is_empty() {
        let _ = writeln!(out, "  {}", painter.dim("none"));
        return;
    }
    let rows: Vec<GroupRow> = counts
        .iter()
        .map(|g| GroupRow {
            key: g.key.clone(),
            count: g.count,
        })
        .collect();
    let _ = writeln!(out, "{}", output::render_table(&rows));
}

fn ids<T: std::fmt::Display>(title: &str, items: &[T], painter: Painter, out: &mut String) {
    let _ = writeln!(out, "\n{} ({})", painter.heading(title), items.len());
    for item in items {
        let _ = writeln!(out, "  {item}");
    }
}

fn detail(stats: &Statistics, painter: Painter) -> String {
    let mut out = String::new();
    let t = stats.totals;
    let _ = writeln!(
        out,
        "{} {} areas, {} devices, {} entities",
        painter.heading("Totals:"),
        t.areas,
        t.devices,
        t.entities
    );

    groups("Entities by domain", &stats.entities_by_domain, painter, &mut out);
    groups("Devices by manufacturer", &stats.devices_by_manufacturer, painter, &mut out);
    groups("Devices by area", &stats.devices_by_area, painter, &mut out);
    groups("Entities by area", &stats.entities_by_area, painter, &mut out);

    ids("Orphaned devices", &stats.orphan_devices, painter, &mut out);
    ids("Unassigned devices", &stats.unassigned_devices, painter, &mut out);
    ids("Orphaned entities", &stats.orphan_entities, painter, &mut out);
    let _ = writeln!(
        out,
        "\n{} {}",
        painter.heading("Standalone entities:"),
        stats.standalone_entities.len()
    );

    let automation = &stats.automation;
    ids("Referenced by automations", &automation.referenced, painter, &mut out);
    let _ = writeln!(out, "  not referenced: {}", automation.unreferenced_count);
    if !automation.unmatched.is_empty() {
        ids("Unmatched automation references", &automation.unmatched, painter, &mut out);
    }
    ids("Unavailable entities", &stats.unavailable_entities, painter, &mut out);

    out.trim_end().to_owned()
}

/// Plain output: `key=count` lines for the domain grouping.
fn plain(stats: &Statistics) -> Vec<String> {
    stats
        .entities_by_domain
        .iter()
        .map(|g| format!("{}={}", g.key, g.count))
        .collect()
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let outcome = util::scan(ctx)?;
    let out = output::render_report(
        ctx.output,
        &outcome.statistics,
        |s| detail(s, ctx.painter),
        plain,
    )?;
    output::print_output(&out, ctx.quiet);
    util::note_issues(ctx, &outcome);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use homescan_core::Totals;

    fn stats() -> Statistics {
        Statistics {
            totals: Totals {
                areas: 1,
                devices: 1,
                entities: 3,
            },
            entities_by_domain: vec![
                GroupCount {
                    key: "light".into(),
                    count: 2,
                },
                GroupCount {
                    key: "sensor".into(),
                    count: 1,
                },
            ],
            ..Statistics::default()
        }
    }

    #[test]
    fn plain_lists_domain_counts() {
        assert_eq!(plain(&stats()), vec!["light=2", "sensor=1"]);
    }

    #[test]
    fn detail_renders_sections() {
        let text = detail(&stats(), Painter::new(false));
        assert!(text.starts_with("Totals: 1 areas, 1 devices, 3 entities"));
        assert!(text.contains("Entities by domain"));
        assert!(text.contains("│ light  │ 2     │"));
        assert!(text.contains("Orphaned devices (0)"));
        assert!(!text.contains("Unmatched automation references"));
    }
}
