//! Area listing.

use tabled::Tabled;

use homescan_core::Area;

use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AreaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Devices")]
    devices: usize,
    #[tabled(rename = "Entities")]
    entities: usize,
}

fn row(a: &Area) -> AreaRow {
    AreaRow {
        id: a.id.to_string(),
        name: a.name.clone(),
        devices: a.devices.len(),
        entities: a.entities.len(),
    }
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let outcome = util::scan(ctx)?;
    let areas: Vec<Area> = outcome.graph.areas().cloned().collect();
    let out = output::render_list(ctx.output, &areas, row, |a| a.id.to_string())?;
    output::print_output(&out, ctx.quiet);
    util::note_issues(ctx, &outcome);
    Ok(())
}
