//! Device listing.

use tabled::Tabled;

use homescan_core::{Device, Graph, Placement};

use crate::cli::DevicesArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Placement")]
    placement: String,
    #[tabled(rename = "Entities")]
    entities: usize,
}

fn row(graph: &Graph, d: &Device) -> DeviceRow {
    // Resolved devices show the area name, orphans the dangling id.
    let area = match d.area_id.as_ref() {
        Some(id) => graph.area(id.as_str()).map_or_else(|| id.to_string(), |a| a.name.clone()),
        None => "-".into(),
    };
    DeviceRow {
        id: d.id.to_string(),
        name: or_dash(d.name.as_deref()),
        area,
        manufacturer: or_dash(d.manufacturer.as_deref()),
        model: or_dash(d.model.as_deref()),
        placement: d.placement.to_string(),
        entities: d.entities.len(),
    }
}

fn selected(args: &DevicesArgs, d: &Device) -> bool {
    if args.orphaned {
        d.placement == Placement::Orphaned
    } else if args.unassigned {
        d.placement == Placement::Unassigned
    } else {
        true
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, args: &DevicesArgs) -> Result<(), CliError> {
    let outcome = util::scan(ctx)?;
    let graph = &outcome.graph;
    let devices: Vec<&Device> = graph.devices().filter(|d| selected(args, d)).collect();
    let out = output::render_list(ctx.output, &devices, |d| row(graph, d), |d| d.id.to_string())?;
    output::print_output(&out, ctx.quiet);
    util::note_issues(ctx, &outcome);
    Ok(())
}
