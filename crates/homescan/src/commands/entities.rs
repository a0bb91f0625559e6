//! Entity listing.

use tabled::Tabled;

use homescan_core::{Entity, Graph, Placement};

use crate::cli::EntitiesArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Automated")]
    automated: String,
}

fn row(graph: &Graph, e: &Entity) -> EntityRow {
    let device = e.device_id.as_ref().map(|id| {
        graph
            .device(id.as_str())
            .map_or_else(|| id.to_string(), |d| d.display_name().to_owned())
    });
    EntityRow {
        id: e.id.to_string(),
        name: or_dash(e.friendly_name()),
        state: or_dash(e.state.as_deref()),
        device: or_dash(device.as_deref()),
        area: or_dash(graph.area_of_entity(e.id.as_str()).map(|a| a.name.as_str())),
        automated: if e.referenced_by_automation { "yes" } else { "no" }.into(),
    }
}

fn selected(args: &EntitiesArgs, e: &Entity) -> bool {
    args.domain.as_deref().is_none_or(|d| e.domain() == d)
        && (!args.referenced || e.referenced_by_automation)
        && (!args.orphaned || e.placement == Placement::Orphaned)
}

pub fn handle(ctx: &Context, args: &EntitiesArgs) -> Result<(), CliError> {
    let outcome = util::scan(ctx)?;
    let graph = &outcome.graph;
    let entities: Vec<&Entity> = graph.entities().filter(|e| selected(args, e)).collect();
    let out = output::render_list(ctx.output, &entities, |e| row(graph, e), |e| e.id.to_string())?;
    output::print_output(&out, ctx.quiet);
    util::note_issues(ctx, &outcome);
    Ok(())
}
