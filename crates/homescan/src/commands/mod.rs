//! Command dispatch: bridges CLI args -> scan pipeline -> output formatting.

pub mod areas;
pub mod config_cmd;
pub mod devices;
pub mod entities;
pub mod scan;
pub mod stats;
pub mod storage;
pub mod util;
pub mod validate;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a command that works on a resolved [`Context`].
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Scan => scan::handle(ctx),
        Command::Areas => areas::handle(ctx),
        Command::Devices(args) => devices::handle(ctx, &args),
        Command::Entities(args) => entities::handle(ctx, &args),
        Command::Stats => stats::handle(ctx),
        Command::Storage(args) => storage::handle(ctx, &args).await,
        Command::Validate(args) => validate::handle(ctx, &args),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
