//! Config subcommand handlers.

use std::io::IsTerminal;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Context};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let ctx = Context::resolve(global)?;
            let out = match ctx.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&ctx.config)
                    .map_err(|e| CliError::Render(e.to_string()))?,
                format => output::render_report(format, &ctx.config, |_| String::new(), |_| Vec::new())?,
            };
            output::print_output(out.trim_end(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let (path, cfg) = config::effective_config(global)?;
            if path.exists() {
                let display = path.display().to_string();
                if !global.yes && !std::io::stdin().is_terminal() {
                    return Err(CliError::NonInteractiveRequiresYes { path: display });
                }
                if !util::confirm(&format!("Overwrite {display}?"), global.yes)? {
                    if !global.quiet {
                        eprintln!("Left {display} unchanged");
                    }
                    return Ok(());
                }
            }
            config::save_config_to(&cfg, &path)?;
            tracing::info!(path = %path.display(), "wrote config");
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
